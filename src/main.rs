mod cli;

use clap::Parser;

use cli::{Cli, Command};
use cdr_mapper_lib::config::StoreConfig;
use cdr_mapper_lib::db::RecordStore;
use cdr_mapper_lib::import;
use cdr_mapper_lib::report::ReportCompiler;
use cdr_mapper_lib::workflow::Workflow;
use cdr_mapper_lib::Result;

#[tokio::main]
async fn main() {
    // Initialize logging - default to info level for our crate
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("cdr_mapper=info,cdr_mapper_lib=info"),
    )
    .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = StoreConfig::file(&cli.database).with_reset(cli.reset);
    let store = RecordStore::open(&config).await?;

    match cli.command {
        Command::NewCase(case) => {
            let id = store.save_case(&case.into_case()).await?;
            println!("{}", id);
        }
        Command::Headers { file } => {
            for (i, header) in import::read_csv_headers(&file)?.iter().enumerate() {
                println!("{}\t{}", i, header);
            }
        }
        Command::ImportTowers { case, file, columns } => {
            let result = import::import_towers(&store, case, &file, &columns.mapping()).await?;
            print_json(&result);
        }
        Command::ImportCdrs { case, file, columns } => {
            let result = import::import_cdrs(&store, case, &file, &columns.mapping()).await?;
            print_json(&result);
        }
        Command::Report { case, output_dir } => {
            let summary = ReportCompiler::new(store.clone())
                .generate_report(case, &output_dir)
                .await?;
            print_json(&summary);
        }
        Command::Stats => {
            print_json(&store.stats().await?);
        }
        Command::Run {
            case,
            towers,
            cdrs,
            tower_columns,
            cdr_columns,
            output_dir,
        } => {
            let mut workflow = Workflow::new(store.clone());

            let case_id = workflow.submit_case(&case.into_case()).await?;
            log::info!("Case #{} created", case_id);

            workflow.select_tower_file(&towers)?;
            let tower_result = workflow.map_tower_columns(&tower_columns.mapping()).await?;
            print_json(&tower_result);

            workflow.select_cdr_file(&cdrs)?;
            let cdr_result = workflow.map_cdr_columns(&cdr_columns.mapping()).await?;
            print_json(&cdr_result);

            let summary = workflow.generate_report(&output_dir).await?;
            print_json(&summary);
        }
    }

    store.close().await;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Failed to render output: {}", e),
    }
}
