//! 편집 거리 (Levenshtein).
//!
//! 원래 제안과 에이전트가 고친 답변의 차이를 문자 단위로 잰다.

/// 두 문자열의 최소 편집 거리 (삽입/삭제/치환 각 1).
///
/// 유니코드 스칼라 값 단위로 비교한다. 두 행만 유지하므로 공간은 O(min(m, n)).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // 짧은 쪽을 열로 둔다
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn classic_cases() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("intention", "execution"), 5);
    }

    #[test]
    fn symmetric() {
        assert_eq!(
            levenshtein("saturday", "sunday"),
            levenshtein("sunday", "saturday")
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(levenshtein("안녕하세요", "안녕하세요!"), 1);
        assert_eq!(levenshtein("환불", "교환"), 2);
    }
}
