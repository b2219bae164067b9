use clap::Parser;
use image_filters::cli::{execute_run, execute_worker, Cli, Commands, RunOptions};
use image_filters::core::ProcessingSummary;

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // --help / --version は正常終了、それ以外の引数エラーは 1
            let code = if error.use_stderr() { 1 } else { 0 };
            let _ = error.print();
            std::process::exit(code);
        }
    };

    match cli.command {
        Commands::Run {
            job,
            backend,
            processes,
            report,
        } => {
            let quiet = job.quiet;
            let options = RunOptions {
                job,
                backend,
                processes,
                report,
            };

            match execute_run(options).await {
                Ok(summary) => {
                    if !quiet {
                        print_summary(&summary);
                    }
                }
                Err(error) => {
                    eprintln!("❌ エラー: {error:#}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Worker { job, rank, size } => {
            if let Err(error) = execute_worker(job, rank, size).await {
                eprintln!("❌ [rank {rank}/{size}] エラー: {error:#}");
                std::process::exit(1);
            }
        }
    }
}

fn print_summary(summary: &ProcessingSummary) {
    println!("\n✅ 処理完了!");
    println!("📊 処理結果:");
    println!("   - 対象ファイル数: {}", summary.total_files);
    println!("   - 成功処理数: {}", summary.processed_files);
    println!("   - スキップ数: {}", summary.error_count);
    println!("   - 総処理時間: {}ms", summary.total_processing_time_ms);
    println!(
        "   - 平均処理時間: {:.2}ms/ファイル",
        summary.average_time_per_file_ms
    );

    if summary.error_count > 0 {
        println!("⚠️  {}個のファイルをスキップしました", summary.error_count);
    }
}
