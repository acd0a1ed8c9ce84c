use std::path::PathBuf;

use crm::cli::{self, Command};
use crm::config::{self, ContactSettings};
use crm::model::{ContactSort, Id};

fn print_help() {
    println!("CRM - contacts");
    println!();
    println!("Usage: crm [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  list [--page N] [--sort ORDER]   List contacts (ORDER e.g. \"last_name ASC\")");
    println!("  search <QUERY>                   Search first and last names");
    println!("  show <ID>                        Show one contact");
    println!("  delete <ID>                      Delete a contact");
    println!("  export <CSV_PATH>                Export all contacts as CSV");
    println!();
    println!("Options:");
    println!("  -f, --file <PATH>      Database file path (default: .data/crm.db)");
    println!("  -c, --config <PATH>    JSON settings file (page size, sort, name format)");
    println!("  -h, --help             Show this help");
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Use --help for usage information.");
    std::process::exit(1);
}

fn parse_id(value: Option<String>, command: &str) -> Id<crm::model::Contact> {
    let raw = value.unwrap_or_else(|| fail(&format!("{} requires a contact id", command)));
    Id::parse(&raw).unwrap_or_else(|_| fail(&format!("Invalid contact id: {}", raw)))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut command: Option<Command> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" | "-f" => {
                db_path = args.next().map(PathBuf::from);
                if db_path.is_none() {
                    fail("--file requires a path argument");
                }
            }
            "--config" | "-c" => {
                config_path = args.next().map(PathBuf::from);
                if config_path.is_none() {
                    fail("--config requires a path argument");
                }
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            "list" => {
                let mut page = 1;
                let mut sort = None;
                while let Some(opt) = args.next() {
                    match opt.as_str() {
                        "--page" => {
                            page = args
                                .next()
                                .and_then(|p| p.parse().ok())
                                .unwrap_or_else(|| fail("--page requires a number"));
                        }
                        "--sort" => {
                            let order = args.next().unwrap_or_else(|| fail("--sort requires an order"));
                            sort = Some(
                                ContactSort::from_order_str(&order)
                                    .unwrap_or_else(|| fail(&format!("Unknown sort order: {}", order))),
                            );
                        }
                        other => fail(&format!("Unknown list option: {}", other)),
                    }
                }
                command = Some(Command::List { page, sort });
            }
            "search" => {
                let query: Vec<String> = args.by_ref().collect();
                if query.is_empty() {
                    fail("search requires a query");
                }
                command = Some(Command::Search { query: query.join(" ") });
            }
            "show" => command = Some(Command::Show { id: parse_id(args.next(), "show") }),
            "delete" => command = Some(Command::Delete { id: parse_id(args.next(), "delete") }),
            "export" => {
                let path = args.next().unwrap_or_else(|| fail("export requires a CSV path"));
                command = Some(Command::Export { path });
            }
            other => fail(&format!("Unknown argument: {}", other)),
        }
    }

    let command = command.unwrap_or(Command::List { page: 1, sort: None });

    let settings = match config_path {
        Some(path) => ContactSettings::load(&path).unwrap_or_else(|e| {
            fail(&format!("Could not read settings {}: {}", path.display(), e))
        }),
        None => ContactSettings::default(),
    };

    let db_path = db_path.unwrap_or_else(|| {
        let path = config::default_db_path();
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir).unwrap_or_else(|e| {
                    fail(&format!("Failed to create {}: {}", dir.display(), e))
                });
            }
        }
        path
    });

    if let Err(e) = cli::run(&db_path, settings, command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
