use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};

use strms::api::{ApiError, MockApi};
use strms::calendar::{CalendarGrid, EventBuckets, MonthRef, month_events};
use strms::config::{self, PlannerConfig};
use strms::core::event::EventDraft;
use strms::core::task::{Priority, Task, TaskDraft, TaskQuery};
use strms::core::user::NewUser;

const USAGE: &str = "usage: strms [--config <path>] <command> [args]

commands:
  login <email> <password>
  register <first> <last> <email> <password>
  logout
  whoami
  tasks
  add-task <title> [low|medium|high] [YYYY-MM-DD]
  progress <task-id> <0-100>
  delete-task <task-id>
  events [YYYY-MM]
  add-event <title> <YYYY-MM-DD> [HH:MM] [HH:MM]
  delete-event <event-id>
  calendar [YYYY-MM]
  chat <message...>
  history
  dashboard";

fn init_logging(debug: bool) {
    // Journal sink (`journalctl --user -t strms -f`): strms at info/debug, everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("strms") {
                let max = if strms::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    strms::set_debug_logging(debug);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("strms".to_string()),
        // No journald (containers, non-Linux): run without a log sink.
        Err(_) => return,
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    }
}

fn success(payload: impl Serialize) -> Value {
    let mut out = json!({ "success": true });
    let extra = serde_json::to_value(payload);
    if let (Some(map), Ok(Value::Object(extra))) = (out.as_object_mut(), extra) {
        map.extend(extra);
    }
    out
}

fn failure(message: impl std::fmt::Display) -> Value {
    json!({ "success": false, "message": message.to_string() })
}

fn parse_id(arg: Option<&String>) -> Result<u64, String> {
    arg.ok_or("missing id")?
        .parse()
        .map_err(|e| format!("bad id: {}", e))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("bad date '{}': {}", s, e))
}

fn parse_month(arg: Option<&String>) -> Result<Option<MonthRef>, String> {
    match arg {
        Some(s) => MonthRef::parse(s)
            .map(Some)
            .ok_or_else(|| format!("bad month '{}', expected YYYY-MM", s)),
        None => Ok(None),
    }
}

enum Outcome {
    Json(Value),
    Text(String),
}

impl From<Result<Value, ApiError>> for Outcome {
    fn from(result: Result<Value, ApiError>) -> Self {
        Self::Json(result.unwrap_or_else(failure))
    }
}

async fn run(api: &MockApi, command: &str, args: &[String]) -> Result<Outcome, String> {
    let arg = |i: usize| {
        args.get(i)
            .ok_or_else(|| format!("missing argument {}\n\n{}", i + 1, USAGE))
    };
    let today = chrono::Local::now().date_naive();

    let outcome: Outcome = match command {
        "login" => api
            .login(arg(0)?, arg(1)?)
            .await
            .map(|user| success(json!({ "user": user })))
            .into(),
        "register" => {
            let new_user = NewUser::new(arg(0)?, arg(1)?, arg(2)?, arg(3)?);
            api.register(new_user)
                .await
                .map(|user| success(json!({ "user": user })))
                .into()
        }
        "logout" => {
            api.logout();
            Outcome::Json(success(json!({})))
        }
        "whoami" => match api.current_user() {
            Some(user) => Outcome::Json(success(json!({ "user": user }))),
            None => Outcome::Json(failure(ApiError::NoSession)),
        },
        "tasks" => api
            .get_tasks()
            .await
            .map(|tasks| success(json!({ "tasks": TaskQuery::default().apply(&tasks) })))
            .into(),
        "add-task" => {
            let mut draft = TaskDraft::new(arg(0)?);
            if let Some(p) = args.get(1) {
                draft.priority = Priority::parse(p).ok_or_else(|| format!("bad priority '{}'", p))?;
            }
            if let Some(d) = args.get(2) {
                draft.due_date = Some(parse_date(d)?);
            }
            api.save_task(draft)
                .await
                .map(|tasks| success(json!({ "tasks": tasks })))
                .into()
        }
        "progress" => {
            let id = parse_id(args.first())?;
            let progress: u8 = arg(1)?.parse().map_err(|e| format!("bad progress: {}", e))?;
            let result: Result<Vec<Task>, ApiError> = async {
                let tasks = api.get_tasks().await?;
                let task = tasks
                    .iter()
                    .find(|t| t.id == id)
                    .ok_or(ApiError::NotFound { kind: "task", id })?;
                let mut draft = TaskDraft::from(task);
                draft.progress = progress;
                api.save_task(draft).await
            }
            .await;
            result.map(|tasks| success(json!({ "tasks": tasks }))).into()
        }
        "delete-task" => api
            .delete_task(parse_id(args.first())?)
            .await
            .map(|tasks| success(json!({ "tasks": tasks })))
            .into(),
        "events" => api
            .get_events(parse_month(args.first())?)
            .await
            .map(|events| success(json!({ "events": events })))
            .into(),
        "add-event" => {
            let draft = EventDraft::new(arg(0)?, parse_date(arg(1)?)?)
                .with_times(args.get(2).map(String::as_str), args.get(3).map(String::as_str));
            api.save_event(draft)
                .await
                .map(|events| success(json!({ "events": events })))
                .into()
        }
        "delete-event" => api
            .delete_event(parse_id(args.first())?)
            .await
            .map(|events| success(json!({ "events": events })))
            .into(),
        "calendar" => {
            let month = parse_month(args.first())?.unwrap_or_else(|| MonthRef::of(today));
            let events = match api.get_events(Some(month)).await {
                Ok(events) => events,
                Err(e) => return Ok(Outcome::Json(failure(e))),
            };
            let grid = CalendarGrid::build(month.first_day(), today);
            let buckets = EventBuckets::for_grid(&grid, &events);
            let mut text = grid.to_text(|d| buckets.has_events(d));
            for event in month_events(&events, month) {
                let label = event.time_label();
                text.push_str(&format!("\n{}  {:<13} {}", event.date, label, event.title));
            }
            Outcome::Text(text)
        }
        "chat" => {
            if args.is_empty() {
                return Err(format!("missing message\n\n{}", USAGE));
            }
            api.send_chat_message(&args.join(" "))
                .await
                .map(success)
                .into()
        }
        "history" => api
            .get_chat_history()
            .await
            .map(|history| success(json!({ "history": history })))
            .into(),
        "dashboard" => api
            .dashboard(today)
            .await
            .map(|dashboard| success(json!({ "dashboard": dashboard })))
            .into(),
        other => return Err(format!("unknown command '{}'\n\n{}", other, USAGE)),
    };
    Ok(outcome)
}

#[tokio::main]
async fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = std::path::PathBuf::from(args.remove(i + 1));
            args.remove(i);
            path
        }
        _ => config::default_config_path(),
    };
    let config = PlannerConfig::load(&config_path);
    init_logging(config.debug_logging);

    let Some((command, rest)) = args.split_first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let api = match MockApi::from_config(&config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Cannot open data directory {}: {}", config.data_directory.display(), e);
            std::process::exit(1);
        }
    };

    match run(&api, command, rest).await {
        Ok(Outcome::Json(value)) => {
            let ok = value["success"].as_bool().unwrap_or(false);
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            if !ok {
                std::process::exit(1);
            }
        }
        Ok(Outcome::Text(text)) => println!("{}", text),
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    }
}
