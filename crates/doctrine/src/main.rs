mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doctrine")]
#[command(about = "フリートドクトリンのフィット適合チェッカー", long_about = None)]
struct Cli {
    /// ドクトリンルート (doctrine.kdl を含むディレクトリ)
    #[arg(short, long, global = true, env = "DOCTRINE_ROOT")]
    data: Option<PathBuf>,

    /// 詳細ログを表示
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// DNA をデコードして JSON で表示
    Decode {
        /// フィット DNA
        dna: String,
    },
    /// エクスポートテキストを DNA に変換
    Encode {
        /// 入力ファイル (省略時は標準入力)
        file: Option<PathBuf>,
    },
    /// フィットを判定
    Evaluate {
        /// フィット DNA
        dna: String,
        /// スキルレベルの JSON ファイル ({"スキル名またはID": レベル})
        #[arg(short, long)]
        skills: Option<PathBuf>,
        /// 装着インプラントの ID (カンマ区切り)
        #[arg(short, long, value_delimiter = ',')]
        implants: Vec<i32>,
        /// フリート滞在時間 (時間)
        #[arg(long, default_value = "0")]
        hours: i64,
        /// 結果を JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// ルールファイルを検証
    Validate,
    /// カテゴリの一覧を表示
    Categories,
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "✗ エラー:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let data = cli.data.as_deref();
    match cli.command {
        Commands::Version => {
            println!("doctrine {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Decode { dna } => commands::decode::handle(&dna),
        Commands::Encode { file } => commands::encode::handle(data, file.as_deref()),
        Commands::Evaluate {
            dna,
            skills,
            implants,
            hours,
            json,
        } => commands::evaluate::handle(
            data,
            commands::evaluate::EvaluateArgs {
                dna,
                skills,
                implants,
                hours,
                json,
            },
        ),
        Commands::Validate => commands::validate::handle(data),
        Commands::Categories => commands::categories::handle(data),
    }
}
