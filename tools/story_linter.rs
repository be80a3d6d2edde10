/// Story Linter: checks a game document for broken references and
/// inheritance problems.
///
/// Usage: story_linter <game.json> [--template <id>]

use choicecraft::core::hierarchy;
use choicecraft::core::lint::{lint, Severity};
use choicecraft::schema::game::GameData;
use choicecraft::schema::ids::TemplateId;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: story_linter <game.json> [--template <id>]");
        process::exit(0);
    }

    let game_path = Path::new(&args[1]);
    let mut show_template = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--template" && i + 1 < args.len() {
            i += 1;
            show_template = Some(TemplateId::new(args[i].as_str()));
        }
        i += 1;
    }

    let game = match GameData::load_from_json(game_path) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("ERROR: Failed to load game file: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded '{}': {} templates, {} entities, {} choices",
        game.title,
        game.templates.len(),
        game.entities.len(),
        game.choices.len()
    );

    if let Some(ref id) = show_template {
        print_template(&game, id);
    }

    let issues = lint(&game);

    println!("\n=== Story Lint Report ===\n");

    if issues.is_empty() {
        println!("All checks passed!");
    }

    for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
        println!("{}", issue);
    }
    for issue in issues.iter().filter(|i| i.severity == Severity::Error) {
        println!("{}", issue);
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    println!(
        "\nSummary: {} errors, {} warnings",
        errors,
        issues.len() - errors
    );

    if errors == 0 {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn print_template(game: &GameData, id: &TemplateId) {
    println!("\n=== Template '{}' ===\n", id);
    match hierarchy::resolve(id, &game.templates) {
        Ok(Some(resolved)) => {
            for attr in &resolved.attributes {
                println!(
                    "  {:<20} {:<8} from {}",
                    attr.definition.id,
                    format!("{:?}", attr.definition.kind),
                    attr.defined_by
                );
            }
            for attr in &resolved.component_attributes {
                println!(
                    "  {:<20} {:<8} via component {}",
                    attr.key,
                    format!("{:?}", attr.definition.kind),
                    attr.component_id
                );
            }
            if resolved.components.is_empty() {
                println!("  (no components)");
            }
        }
        Ok(None) => println!("  template not found"),
        Err(e) => println!("  {}", e),
    }
}
