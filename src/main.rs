use busmap::config::cli::{Command, StudentArgs};
use busmap::core::ConfigProvider;
use busmap::utils::error::{BusMapError, ErrorSeverity};
use busmap::utils::{logger, validation::Validate};
use busmap::{
    validate_student, write_roster_csv, BusMapConfig, CliConfig, LocalStorage, RosterStore,
    Student, StudentId,
};
use clap::Parser;

type Store = RosterStore<LocalStorage>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 載入配置
    let mut config = match BusMapConfig::from_file_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.data_dir().to_string());
    let mut store = RosterStore::load(storage, config.storage_key());

    if let Err(e) = run(&cli.command, &mut store) {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        report(&e);

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn run(command: &Command, store: &mut Store) -> busmap::Result<()> {
    match command {
        Command::Add(fields) => add(store, fields),
        Command::Edit {
            id,
            fields,
            clear_siblings,
            active,
        } => edit(store, *id, fields, *clear_siblings, *active),
        Command::Delete { id } => {
            let removed = store.delete(*id)?;
            println!("✅ {} deleted successfully", removed.full_name());
            Ok(())
        }
        Command::Link { id, siblings } => {
            let missing = store.missing_ids(siblings);
            store.link_siblings(*id, siblings)?;
            warn_missing_siblings(&missing);
            let linked = store.get(*id).map(|s| s.siblings.len()).unwrap_or(0);
            println!("✅ Siblings linked ({} total)", linked);
            Ok(())
        }
        Command::List { .. } => {
            let filter = command.list_filter().unwrap_or_default();
            let students = store.query(&filter);
            for student in &students {
                print_student(store, student);
            }
            println!("{} student(s)", students.len());
            Ok(())
        }
        Command::Export { output } => {
            let file = std::fs::File::create(output)?;
            let rows = write_roster_csv(store.students(), file)?;
            println!("📁 Exported {} student(s) to {}", rows, output);
            Ok(())
        }
    }
}

fn add(store: &mut Store, fields: &StudentArgs) -> busmap::Result<()> {
    let draft = fields.to_new_draft();
    validate_student(&draft, store.students(), None)?;

    let missing = store.missing_ids(&draft.siblings);
    let student = store.add(draft)?;
    println!("✅ {} added successfully", student.full_name());
    println!("   id: {}", student.id);
    warn_missing_siblings(&missing);
    Ok(())
}

fn edit(
    store: &mut Store,
    id: StudentId,
    fields: &StudentArgs,
    clear_siblings: bool,
    reactivate: bool,
) -> busmap::Result<()> {
    let current = store.get(id).ok_or(BusMapError::NotFound { id })?;
    let draft = fields.merge_into(current, clear_siblings, reactivate);
    validate_student(&draft, store.students(), Some(id))?;

    let missing = store.missing_ids(&draft.siblings);
    let student = store.edit(id, draft)?;
    println!("✅ {} updated successfully", student.full_name());
    warn_missing_siblings(&missing);
    Ok(())
}

fn warn_missing_siblings(missing: &[StudentId]) {
    for id in missing {
        tracing::warn!("Sibling id {} is not in the roster", id);
        println!("⚠️ Skipped unknown sibling id {}", id);
    }
}

fn print_student(store: &Store, student: &Student) {
    let siblings: Vec<String> = student
        .siblings
        .iter()
        .filter_map(|id| store.get(*id))
        .map(Student::full_name)
        .collect();

    println!(
        "{}  {:<24} stop {:>3}  {:<4}  {}{}",
        student.id,
        student.full_name(),
        student.stop_number,
        student.route_type(),
        if student.active { "active" } else { "inactive" },
        if siblings.is_empty() {
            String::new()
        } else {
            format!("  siblings: {}", siblings.join(", "))
        }
    );
}

fn report(error: &BusMapError) {
    match error {
        BusMapError::InvalidStudent(errors) => {
            eprintln!("❌ Please fix all errors in the form before submitting.");
            for (field, message) in errors.iter() {
                eprintln!("   {}: {}", field, message);
            }
        }
        other => eprintln!("❌ {}", other.user_friendly_message()),
    }
    eprintln!("💡 {}", error.recovery_suggestion());
}
