use anyhow::{Context, Result};
use clap::Parser;
use daily_sales::{cli, config, merge, note, pipeline, portal, report, roster};
use cli::{Cli, Commands};
use config::Config;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        error!(error = %err, "명령 실패");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "원인");
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load().context("설정 파일을 읽지 못했습니다")?;
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let paths = config.resolve(&base_dir);
    let today = chrono::Local::now().date_naive();

    let merge_config = |date: Option<chrono::NaiveDate>| merge::MergeConfig {
        output_dir: paths.output_dir.clone(),
        template_path: paths.template.clone(),
        master_sheet: config.master_sheet.clone(),
        date: date.unwrap_or(today),
    };

    match cli.command {
        Commands::Run { merge_schedule, pages, date } => {
            println!("📊 daily-sales - 일일매출 수집\n");
            paths.ensure_output_dir()?;

            println!("[1/2] 계정 목록 읽는 중...");
            let entries = roster::read_roster(&paths.roster, &config.roster_sheet)
                .with_context(|| format!("계정 목록: {}", paths.roster.display()))?;
            println!("✔ {}개 업체\n", entries.len());

            println!("[2/2] 업체별 수집 중...");
            let schedule = merge_schedule.unwrap_or(config.merge_schedule);
            let merge = merge_config(date);
            let summary = match pages {
                Some(dir) => {
                    let source = portal::SavedPages::new(dir);
                    pipeline::run(&source, &entries, &merge, schedule).await?
                }
                None => {
                    let source = portal::HttpPortal::new(config.login.clone());
                    pipeline::run(&source, &entries, &merge, schedule).await?
                }
            };

            for (company, outcome) in &summary.outcomes {
                match outcome {
                    pipeline::CompanyOutcome::Written { report, .. } => {
                        println!("  ✔ {} → {}", company, report.display())
                    }
                    pipeline::CompanyOutcome::Failed { error } => {
                        println!("  ✖ {}: {}", company, error)
                    }
                }
            }
            if let Some(master) = &summary.master_path {
                println!("\n✔ 마스터 파일: {}", master.display());
            }
            println!(
                "\n✅ 완료 (성공 {} / 실패 {})",
                summary.succeeded(),
                summary.failed()
            );
        }

        Commands::Build { html, company } => {
            paths.ensure_output_dir()?;
            let content = std::fs::read_to_string(&html)
                .with_context(|| format!("HTML 파일: {}", html.display()))?;
            let dataset = daily_sales::extract::extract_dataset(&content);
            let (path, summary) =
                report::write_company_report(&dataset, &company, &paths.output_dir)?;

            println!("✔ {} 저장", path.display());
            println!(
                "  주문 {} / 에누리 {} / 견적 {} (중복 표시 {})",
                summary.orders, summary.discounts, summary.estimates, summary.flagged
            );
        }

        Commands::Merge { date } => {
            let merge = merge_config(date);
            let result = merge::merge_into_master(&merge)?;
            println!("✔ 마스터 파일: {}", result.master_path.display());
            println!("  병합 {}개 / 미일치 {}개", result.merged.len(), result.unmatched.len());
        }

        Commands::Note { text, date } => {
            let merge = merge_config(date);
            let master = merge::master_path(&merge);
            let row = note::append_note(&master, &config.master_sheet, config.note_column, &text)
                .with_context(|| format!("마스터 파일: {}", master.display()))?;
            println!("✔ {} 행 {}에 메모 추가", master.display(), row);
        }

        Commands::Config { show, init } => {
            if init {
                let path = config.save()?;
                println!("✔ 설정 파일 저장: {}", path.display());
            }

            if show || !init {
                println!("설정:");
                println!("  계정 목록: {} [{}]", paths.roster.display(), config.roster_sheet);
                println!("  템플릿: {} [{}]", paths.template.display(), config.master_sheet);
                println!("  결과 폴더: {}", paths.output_dir.display());
                println!("  로그인 필드: {} / {}", config.login.user_field, config.login.password_field);
                println!("  대기 시간: {}초 (로딩 {}초)", config.login.timeout_seconds, config.login.settle_seconds);
                println!("  병합 시점: {}", config.merge_schedule);
            }
        }
    }

    Ok(())
}
