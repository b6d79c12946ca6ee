use crate::domain::model::{Student, StudentDraft, StudentId};
use crate::core::roster::StudentFilter;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "busmap")]
#[command(about = "Manage the students assigned to bus routes")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "busmap.toml")]
    pub config: String,

    /// Override storage.data_dir from the config file
    #[arg(long)]
    pub data_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add a student to the roster
    Add(StudentArgs),
    /// Edit a student; omitted flags keep their current value
    Edit {
        id: StudentId,
        #[command(flatten)]
        fields: StudentArgs,
        /// Remove every sibling link before applying --sibling
        #[arg(long)]
        clear_siblings: bool,
        /// Mark the student active again
        #[arg(long, conflicts_with = "inactive")]
        active: bool,
    },
    /// Delete a student and every sibling link to it
    Delete { id: StudentId },
    /// Link a student with one or more siblings
    Link {
        id: StudentId,
        #[arg(required = true)]
        siblings: Vec<StudentId>,
    },
    /// List students
    List {
        /// Case-insensitive match on "first last"
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        active: bool,
        #[arg(long)]
        sibling_of: Option<StudentId>,
    },
    /// Export the roster as CSV
    Export {
        #[arg(short, long)]
        output: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct StudentArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long = "stop")]
    pub stop_number: Option<String>,
    #[arg(long)]
    pub am: bool,
    #[arg(long)]
    pub pm: bool,
    #[arg(long)]
    pub inactive: bool,
    #[arg(long = "sibling")]
    pub siblings: Vec<StudentId>,
}

impl StudentArgs {
    /// Draft for a new student. Missing text fields stay empty so the
    /// validator reports them.
    pub fn to_new_draft(&self) -> StudentDraft {
        StudentDraft {
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            stop_number: self.stop_number.clone().unwrap_or_default(),
            am_route: self.am,
            pm_route: self.pm,
            siblings: self.siblings.iter().copied().collect(),
            active: !self.inactive,
        }
    }

    /// Applies the given flags on top of `current`. Route flags replace both
    /// routes when either is given.
    pub fn merge_into(
        &self,
        current: &Student,
        clear_siblings: bool,
        reactivate: bool,
    ) -> StudentDraft {
        let mut draft = current.to_draft();

        if let Some(first_name) = &self.first_name {
            draft.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            draft.last_name = last_name.clone();
        }
        if let Some(stop_number) = &self.stop_number {
            draft.stop_number = stop_number.clone();
        }
        if self.am || self.pm {
            draft.am_route = self.am;
            draft.pm_route = self.pm;
        }
        if self.inactive {
            draft.active = false;
        } else if reactivate {
            draft.active = true;
        }
        if clear_siblings {
            draft.siblings.clear();
        }
        draft.siblings.extend(self.siblings.iter().copied());

        draft
    }
}

impl Command {
    pub fn list_filter(&self) -> Option<StudentFilter> {
        match self {
            Command::List {
                search,
                active,
                sibling_of,
            } => Some(StudentFilter {
                search: search.clone(),
                active_only: *active,
                sibling_of: *sibling_of,
            }),
            _ => None,
        }
    }
}
