pub mod change_id;
pub mod cherry;
pub mod diff;
pub mod error;
pub mod git_log;
pub mod ignore;
pub mod index;
pub mod record;
pub mod refs;
pub mod repository;
pub mod source;

pub use change_id::{parse_message, ParsedMessage, CHANGE_ID_PREFIX};
pub use cherry::{Cherry, DEFAULT_HEAD};
pub use diff::unmerged;
pub use error::{CherryError, Result};
pub use git_log::{parse_log, GitLogSource};
pub use ignore::{
    find_ignore_file, load_ignore_list, parse_ignore_list, read_ignore_file, IGNORE_FILE_NAME,
};
pub use index::ChangeIndex;
pub use record::{CommitRecord, IgnoreEntry};
pub use refs::{RefRules, DEFAULT_REF_RULES, REF_RULES_CONFIG_KEY};
pub use repository::Repository;
pub use source::{CommitSource, MemorySource};
