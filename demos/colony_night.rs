/// Colony Night: walks the bundled outpost story, printing each node and
/// the options the rules allow, then rewinds with undo.
///
/// Usage: cargo run --example colony_night [-- <game.json> [--seed <n>]]

use choicecraft::core::config::EngineConfig;
use choicecraft::core::session::Playthrough;
use choicecraft::schema::game::GameData;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut game_path = "demos/outpost.json".to_string();
    let mut config = EngineConfig {
        seed: Some(42),
        ..Default::default()
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" if i + 1 < args.len() => {
                i += 1;
                config.seed = args[i].parse().ok();
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config = match EngineConfig::load_from_ron(Path::new(&args[i])) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("ERROR: Failed to load config: {}", e);
                        process::exit(1);
                    }
                };
            }
            other => game_path = other.to_string(),
        }
        i += 1;
    }

    let game = match GameData::load_from_json(Path::new(&game_path)) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("ERROR: Failed to load game file: {}", e);
            process::exit(1);
        }
    };

    let mut run = match Playthrough::builder().config(&config).build(&game) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    println!("=== {} ===", game.title);

    // Take the last visible option at every node.
    while let Some(choice) = run.current_choice() {
        println!("\n{}", choice.title);
        if !choice.description.is_empty() {
            println!("  {}", choice.description);
        }

        let options = run.visible_options();
        for option in &options {
            println!("  - [{}] {}", option.id, option.text);
        }
        let Some(pick) = options.last() else {
            println!("  (no options available, the story stalls here)");
            break;
        };
        println!("  > {}", pick.text);

        if let Err(e) = run.choose(&pick.id) {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    }

    println!("\n=== Final roster ===");
    for entity in &run.game().entities {
        let mut values: Vec<String> = entity
            .attribute_values
            .iter()
            .map(|(k, v)| match v {
                Some(v) => format!("{}={}", k, v),
                None => format!("{}=null", k),
            })
            .collect();
        values.sort();
        println!("  {} ({}) {}", entity.name, entity.template_id, values.join(" "));
    }

    println!("\nRewinding {} steps", run.steps() - 1);
    while run.can_undo() {
        run.undo();
    }
    println!(
        "Back at '{}' with {} entities",
        run.current_choice().map(|c| c.title.as_str()).unwrap_or("the end"),
        run.game().entities.len()
    );
}
