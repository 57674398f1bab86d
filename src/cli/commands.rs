use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "helpdesk")]
#[command(version, about = "An IT helpdesk issue tracker")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new helpdesk in the current directory
    Init,

    /// Report a new issue
    Report {
        /// Short summary of the problem
        title: String,

        /// Longer description
        #[arg(long, short = 'd', default_value = "")]
        description: String,

        /// Category name or id
        #[arg(long, short = 'c')]
        category: String,

        /// Reporting user (username or id)
        #[arg(long, short = 'u')]
        user: String,

        /// Read the description from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List issues, optionally filtered
    List {
        /// Filter query, e.g. "category:network state:new vpn"
        #[arg(value_name = "QUERY")]
        query: Vec<String>,

        /// Only issues assigned to this user (username or id)
        #[arg(long)]
        assigned_to: Option<String>,

        /// Only issues reported by this user (username or id)
        #[arg(long)]
        reported_by: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single issue with its comments
    Get {
        /// Issue id
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assign an issue to a staff member
    Assign {
        /// Issue id
        id: i64,

        /// Staff member (username or id)
        staff: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Take an issue and start working on it
    Nominate {
        /// Issue id
        id: i64,

        /// Staff member taking the issue (username or id)
        staff: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a comment to an issue
    Comment {
        /// Issue id
        id: i64,

        /// Comment text
        text: String,

        /// Commenting user (username or id)
        #[arg(long, short = 'u')]
        user: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark an issue resolved
    Resolve {
        /// Issue id
        id: i64,

        /// What fixed it
        resolution: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set an issue's state label
    SetState {
        /// Issue id
        id: i64,

        /// New state (e.g. "In Progress", "Blocked")
        state: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Close a resolved issue
    Finalize {
        /// Issue id
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the statistics page
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Knowledge base
    Kb(KbCommand),

    /// Manage users
    User(UserCommand),

    /// Manage issue categories
    Category(CategoryCommand),

    /// Manage keywords
    Keyword(KeywordCommand),

    /// Write a markdown export to .helpdesk/export/
    Export {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the MCP server (stdio unless --http is given)
    Serve {
        /// Serve streamable HTTP on this address, e.g. 127.0.0.1:8080
        #[arg(long, value_name = "ADDR")]
        http: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct KbCommand {
    #[command(subcommand)]
    pub action: KbAction,
}

#[derive(Subcommand, Debug)]
pub enum KbAction {
    /// List resolved issues by category
    List {
        /// Only this category
        #[arg(long, short = 'c')]
        category: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Publish an article from a resolved issue
    Publish {
        /// Issue id
        id: i64,

        /// Article title (defaults to the issue title)
        #[arg(long, default_value = "")]
        title: String,

        /// Article body (defaults to the issue description)
        #[arg(long, short = 'd', default_value = "")]
        description: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct UserCommand {
    #[command(subcommand)]
    pub action: UserAction,
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Register a user
    Add {
        username: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        contact_number: Option<String>,

        /// Role name: User, "IT Staff" or Manager
        #[arg(long, default_value = "User")]
        role: String,

        #[arg(long, default_value = "")]
        password: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List users
    List {
        /// Only IT staff
        #[arg(long)]
        staff: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub action: CategoryAction,
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    /// Add a category
    Add {
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List categories
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct KeywordCommand {
    #[command(subcommand)]
    pub action: KeywordAction,
}

#[derive(Subcommand, Debug)]
pub enum KeywordAction {
    /// Add a keyword
    Add {
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List keywords
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Tag an issue with a keyword, creating the keyword if needed
    Tag {
        /// Issue id
        id: i64,

        keyword: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
