use synthbulk_cli::{batch_request, build_cli, commands, ids, init_tracing, load_settings};
use synthbulk_model::FieldGroup;

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let settings = match load_settings(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };
    init_tracing(&settings);

    let result = match matches.subcommand() {
        Some(("project", args)) => {
            let store = args.get_one::<std::path::PathBuf>("store").cloned().unwrap_or_default();
            commands::project(&store, &ids(args)).await.map(|out| (out, true))
        }
        Some(("validate", args)) => {
            let group = args.get_one::<FieldGroup>("group").copied().unwrap_or(FieldGroup::Other);
            let text = args.get_one::<String>("text").cloned().unwrap_or_default();
            commands::validate_text(group, &text, &settings)
                .await
                .map(|out| (out, true))
        }
        Some(("plan", args)) => commands::plan(&batch_request(args), &settings)
            .await
            .map(|out| (out, true)),
        Some(("apply", args)) => commands::apply(&batch_request(args), &settings)
            .await
            .map(|outcome| (commands::render_outcome(&outcome), outcome.is_success())),
        _ => Ok((String::new(), true)),
    };

    match result {
        Ok((out, success)) => {
            println!("{out}");
            std::process::exit(if success { 0 } else { 1 });
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
