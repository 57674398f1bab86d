mod commands;
mod handlers;

pub use commands::{
    CategoryAction, CategoryCommand, Cli, Commands, KbAction, KbCommand, KeywordAction,
    KeywordCommand, UserAction, UserCommand,
};
pub use handlers::{
    handle_assign, handle_category_add, handle_category_list, handle_comment, handle_export,
    handle_finalize, handle_get, handle_init, handle_kb_list, handle_kb_publish,
    handle_keyword_add, handle_keyword_list, handle_keyword_tag, handle_list, handle_nominate,
    handle_report, handle_resolve, handle_serve, handle_set_state, handle_stats, handle_user_add,
    handle_user_list,
};
