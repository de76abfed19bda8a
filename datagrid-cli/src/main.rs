//! Run the grid engine over a JSON document and print the resulting page.

mod error;
mod input;
mod render;

use std::fs;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use datagrid::DataGrid;
use datagrid::Interaction;
use datagrid::filter::QueryMode;
use datagrid::group::GroupSpec;
use datagrid::model::Column;
use datagrid::model::RowId;
use datagrid::sort::SortSpec;
use datagrid::store::RowStore;
use log::LevelFilter;
use log::info;
use log::warn;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::error::CliError;
use crate::input::Document;

#[derive(Parser)]
#[command(name = "datagrid")]
#[command(version = "0.1")]
#[command(about = "Filter, sort, group and paginate a JSON dataset")]
struct Cli {
    /// Input document with columns, rows and view state
    input: PathBuf,

    /// Global filter text (overrides the document)
    #[arg(short, long)]
    query: Option<String>,

    /// Use fuzzy matching for the global filter
    #[arg(long)]
    fuzzy: bool,

    /// Sort key, prefix with '-' for descending. Repeat for multiple keys.
    #[arg(short, long, value_name = "COLUMN", allow_hyphen_values = true)]
    sort: Vec<String>,

    /// Group-by column. Repeat for a composite key.
    #[arg(short, long, value_name = "COLUMN")]
    group: Vec<String>,

    /// Zero-based page number
    #[arg(short, long)]
    page: Option<usize>,

    /// Rows per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Print the derived view as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(cli: &Cli) -> Result<(), CliError> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::LogFile {
                path: path.clone(),
                source,
            })?;
            WriteLogger::init(level, Config::default(), file)?;
        }
        None => TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?,
    }
    Ok(())
}

fn parse_sort(keys: &[String]) -> SortSpec {
    keys.iter().fold(SortSpec::new(), |spec, key| match key.strip_prefix('-') {
        Some(column) => spec.then_desc(column),
        None => spec.then_asc(key.as_str()),
    })
}

fn build(cli: &Cli, doc: Document) -> Result<DataGrid, CliError> {
    let mut config = doc.config;
    if let Some(page_size) = cli.page_size {
        config = config.with_page_size(page_size);
    }
    if cli.fuzzy {
        config = config.with_query_mode(QueryMode::Fuzzy);
    }

    let columns: Vec<Column> = doc.columns.into_iter().map(Column::from).collect();
    let store = RowStore::new(columns, doc.rows)?;
    info!("Loaded {} rows, {} columns", store.len(), store.columns().len());

    let mut view = doc.view;
    if let Some(query) = &cli.query {
        view.filter.query = query.clone();
    }
    if cli.fuzzy {
        view.filter.mode = QueryMode::Fuzzy;
    }
    if !cli.sort.is_empty() {
        view.sort = parse_sort(&cli.sort);
    }
    if !cli.group.is_empty() {
        view.group = cli
            .group
            .iter()
            .fold(GroupSpec::new(), |spec, column| spec.then_by(column.as_str()));
    }

    let mut grid = DataGrid::new(store, config)?;
    grid.set_filter(view.filter)?;
    grid.set_sort(view.sort)?;
    grid.set_group(view.group)?;
    for key in view.collapsed {
        grid.dispatch(Interaction::GroupCollapseToggle { key })?;
    }
    let (known, unknown): (Vec<RowId>, Vec<RowId>) = view
        .selected
        .into_iter()
        .partition(|id| grid.store().contains(id.as_str()));
    if !unknown.is_empty() {
        warn!("Skipping {} selected ids not in the dataset", unknown.len());
    }
    for id in known {
        grid.dispatch(Interaction::RowSelectToggle { id })?;
    }
    grid.dispatch(Interaction::PageChange {
        page: cli.page.unwrap_or(view.page),
    })?;
    Ok(grid)
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let text = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    let doc: Document = serde_json::from_str(&text)?;
    let grid = build(cli, doc)?;
    if cli.json {
        Ok(serde_json::to_string_pretty(grid.view())?)
    } else {
        Ok(render::page(&grid))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logger(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    match run(&cli) {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
