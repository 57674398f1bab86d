use clap::Parser;
use helpdesk::cli::{
    handle_assign, handle_category_add, handle_category_list, handle_comment, handle_export,
    handle_finalize, handle_get, handle_init, handle_kb_list, handle_kb_publish,
    handle_keyword_add, handle_keyword_list, handle_keyword_tag, handle_list, handle_nominate,
    handle_report, handle_resolve, handle_serve, handle_set_state, handle_stats, handle_user_add,
    handle_user_list, CategoryAction, Cli, Commands, KbAction, KeywordAction, UserAction,
};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays clean for JSON output and MCP stdio.
fn init_logging() {
    let filter = EnvFilter::try_from_env("HELPDESK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Report {
            title,
            description,
            category,
            user,
            stdin,
            json,
        } => handle_report(title, description, category, user, stdin, json),
        Commands::List {
            query,
            assigned_to,
            reported_by,
            json,
        } => handle_list(query, assigned_to, reported_by, json),
        Commands::Get { id, json } => handle_get(id, json),
        Commands::Assign { id, staff, json } => handle_assign(id, staff, json),
        Commands::Nominate { id, staff, json } => handle_nominate(id, staff, json),
        Commands::Comment {
            id,
            text,
            user,
            json,
        } => handle_comment(id, text, user, json),
        Commands::Resolve {
            id,
            resolution,
            json,
        } => handle_resolve(id, resolution, json),
        Commands::SetState { id, state, json } => handle_set_state(id, state, json),
        Commands::Finalize { id, json } => handle_finalize(id, json),
        Commands::Stats { json } => handle_stats(json),
        Commands::Kb(kb_cmd) => match kb_cmd.action {
            KbAction::List { category, json } => handle_kb_list(category, json),
            KbAction::Publish {
                id,
                title,
                description,
                json,
            } => handle_kb_publish(id, title, description, json),
        },
        Commands::User(user_cmd) => match user_cmd.action {
            UserAction::Add {
                username,
                first_name,
                last_name,
                email,
                contact_number,
                role,
                password,
                json,
            } => handle_user_add(
                username,
                first_name,
                last_name,
                email,
                contact_number,
                role,
                password,
                json,
            ),
            UserAction::List { staff, json } => handle_user_list(staff, json),
        },
        Commands::Category(category_cmd) => match category_cmd.action {
            CategoryAction::Add { name, json } => handle_category_add(name, json),
            CategoryAction::List { json } => handle_category_list(json),
        },
        Commands::Keyword(keyword_cmd) => match keyword_cmd.action {
            KeywordAction::Add { name, json } => handle_keyword_add(name, json),
            KeywordAction::List { json } => handle_keyword_list(json),
            KeywordAction::Tag { id, keyword, json } => handle_keyword_tag(id, keyword, json),
        },
        Commands::Export { json } => handle_export(json),
        Commands::Serve { http } => handle_serve(http),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
