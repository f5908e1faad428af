//! # replyhub-app
//!
//! replyhub CLI 진입점.
//! 설정 로드, 어댑터 와이어링, 명령 실행, 라이브 뷰 감시.

mod lifecycle;
mod render;
mod wiring;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use replyhub_core::config::AppConfig;
use replyhub_core::config_manager::ConfigManager;
use replyhub_core::models::feedback::FeedbackReason;
use replyhub_suggestion::service::SuggestionService;
use replyhub_suggestion::subscription::SubscriptionManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::lifecycle::LifecycleManager;

/// AI 응답 제안 검토 도구
#[derive(Parser, Debug)]
#[command(name = "replyhub")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼별 설정 디렉토리)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 서버 URL 지정
    #[arg(long, short = 's')]
    server: Option<String>,

    /// API 키
    #[arg(long)]
    api_key: Option<String>,

    /// 에이전트 ID 고정 (원격 신원 조회 생략)
    #[arg(long)]
    agent: Option<String>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 대기 중인 제안 목록
    List {
        #[arg(long, short = 't')]
        ticket: String,
    },
    /// 라이브 뷰 감시 (Ctrl+C로 종료)
    Watch {
        #[arg(long, short = 't')]
        ticket: String,
    },
    /// 제안 수락
    Accept {
        #[arg(long, short = 't')]
        ticket: String,
        #[arg(long)]
        id: String,
    },
    /// 제안 거절
    Reject {
        #[arg(long, short = 't')]
        ticket: String,
        #[arg(long)]
        id: String,
        /// 거절 사유 (irrelevant, incorrect_information, wrong_tone, incomplete, too_generic, policy_violation, other)
        #[arg(long, short = 'r')]
        reason: Option<FeedbackReason>,
        /// 추가 설명
        #[arg(long)]
        text: Option<String>,
    },
    /// 제안 생성 요청
    Generate {
        #[arg(long, short = 't')]
        ticket: String,
    },
    /// 현재 설정 출력
    Config,
}

/// 설정 파일 경로 결정 (CLI 인자 또는 플랫폼별 기본 경로)
///
/// # 플랫폼별 기본 경로:
/// - macOS: `~/Library/Application Support/com.replyhub.replyhub/config.json`
/// - Windows: `%APPDATA%\replyhub\replyhub\config\config.json`
/// - Linux: `~/.config/replyhub/config.json`
fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            ProjectDirs::from("com", "replyhub", "replyhub")
                .map(|p| p.config_dir().join("config.json"))
        })
        .unwrap_or_else(|| PathBuf::from("./replyhub.json"))
}

/// CLI 인자로 설정 덮어쓰기 (파일에는 저장하지 않음)
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(api_key) = &args.api_key {
        config.server.api_key = Some(api_key.clone());
    }
    if let Some(agent) = &args.agent {
        config.agent.agent_id = Some(agent.clone());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "replyhub={},replyhub_app={},replyhub_core={},replyhub_suggestion={},replyhub_network={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = resolve_config_path(args.config.clone());
    let config_manager =
        ConfigManager::with_path(config_path).context("설정 관리자 초기화 실패")?;
    info!("설정 파일: {:?}", config_manager.config_path());

    let mut config = config_manager.get();
    apply_overrides(&mut config, &args);

    if let Command::Config = args.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let wiring = wiring::build(&config)?;

    match args.command {
        Command::List { ticket } => {
            let service = SuggestionService::new(&ticket, wiring.ports, &config.feedback);
            let list = service.fetch_suggestions().await?;
            if list.is_empty() {
                println!("티켓 {ticket}: 대기 중인 제안 없음");
            }
            for suggestion in &list {
                println!("{}", render::suggestion_line(suggestion));
            }
        }
        Command::Watch { ticket } => {
            let service = SuggestionService::new(&ticket, wiring.ports, &config.feedback);
            let manager = SubscriptionManager::new(wiring.feed, config.feedback.change_buffer);
            watch_ticket(&service, &manager).await?;
        }
        Command::Accept { ticket, id } => {
            let service = SuggestionService::new(&ticket, wiring.ports, &config.feedback);
            service.fetch_suggestions().await?;
            let outcome = service.accept_suggestion(&id).await?;
            println!("{}", render::outcome(&outcome));
        }
        Command::Reject {
            ticket,
            id,
            reason,
            text,
        } => {
            let service = SuggestionService::new(&ticket, wiring.ports, &config.feedback);
            service.fetch_suggestions().await?;
            let outcome = service.reject_suggestion(&id, reason, text).await?;
            println!("{}", render::outcome(&outcome));
        }
        Command::Generate { ticket } => {
            let service = SuggestionService::new(&ticket, wiring.ports, &config.feedback);
            let result = service.trigger_generation().await?;
            match (result.success, result.suggestion_id) {
                (true, Some(id)) => println!("생성 요청 완료: {id}"),
                (true, None) => println!("생성 요청 완료"),
                (false, _) => println!(
                    "생성 거부: {}",
                    result.message.as_deref().unwrap_or("사유 없음")
                ),
            }
        }
        Command::Config => {}
    }

    Ok(())
}

/// 초기 조회 후 변경 피드를 구독하고, 종료 신호까지 라이브 뷰를 출력
async fn watch_ticket(service: &SuggestionService, manager: &SubscriptionManager) -> Result<()> {
    let lifecycle = Arc::new(LifecycleManager::new());

    let signal_lifecycle = lifecycle.clone();
    tokio::spawn(async move {
        if let Err(e) = signal_lifecycle.wait_for_signal().await {
            error!("시그널 핸들러 등록 실패: {e}");
            signal_lifecycle.shutdown();
        }
    });

    let mut view_rx = service.watch();
    if let Err(e) = service.fetch_suggestions().await {
        // 조회 실패해도 라이브 구독은 계속
        warn!("초기 조회 실패: {e}");
    }
    service.start_live_updates(manager);

    let initial = render::live_view(service.ticket_id(), &view_rx.borrow_and_update());
    println!("{initial}");

    loop {
        tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let text = render::live_view(service.ticket_id(), &view_rx.borrow_and_update());
                println!("{text}");
            }
            _ = lifecycle.stopped() => {
                info!("감시 종료");
                break;
            }
        }
    }

    if !lifecycle.is_stopping() {
        warn!("라이브 뷰 채널 닫힘");
    }
    service.stop_live_updates(manager);
    manager.shutdown();
    Ok(())
}
