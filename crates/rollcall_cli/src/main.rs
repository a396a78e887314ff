//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire `rollcall_core` end to end against an in-memory store.
//! - Check one student in with the access code given on the command line.
//!
//! Usage: `rollcall_cli [ACCESS_CODE] [CONFIG_JSON]`
//!
//! Logs go to `$ROLLCALL_LOG_DIR`, or `rollcall-logs` under the system temp
//! directory.

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use log::info;
use rollcall_core::db::open_db_in_memory;
use rollcall_core::{
    AttendanceRecorder, AuthError, AuthProvider, AuthStateStream, CheckInDesk, ClassSession,
    Presenter, RoleResolver, RollcallConfig, SqliteStore, User,
};
use std::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_CODE: &str = "ABC123";
const LOG_DIR_ENV: &str = "ROLLCALL_LOG_DIR";
const DEMO_CONFIG: &str = r#"{
    "roles": [
        { "pattern": "^[^@]+@staff\\.", "role": "teacher" },
        { "pattern": "^[^@]+@", "role": "student" }
    ]
}"#;

/// Writes alerts and navigation to stdout.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn show_message(&self, title: &str, body: &str) {
        println!("[{title}] {body}");
    }

    fn navigate(&self, route: &str) {
        println!("-> {route}");
    }
}

/// Replays a fixed identity once, then accepts any sign-out.
struct DemoAuth {
    user: User,
}

#[async_trait]
impl AuthProvider for DemoAuth {
    fn auth_state(&self) -> AuthStateStream {
        stream::iter(vec![Some(self.user.clone())]).boxed()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

fn log_dir(configured: Option<OsString>) -> PathBuf {
    configured
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("rollcall-logs"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let dir = log_dir(std::env::var_os(LOG_DIR_ENV));
    rollcall_core::init_logging(
        rollcall_core::default_log_level(),
        &dir.to_string_lossy(),
    )?;
    if let Some((level, active_dir)) = rollcall_core::logging_status() {
        println!("logs={} level={level}", active_dir.display());
    }

    println!("rollcall_core ping={}", rollcall_core::ping());
    println!("rollcall_core version={}", rollcall_core::core_version());

    let mut args = std::env::args().skip(1);
    let code = args.next().unwrap_or_else(|| DEMO_CODE.to_string());
    let config = match args.next() {
        Some(path) => RollcallConfig::load(path)?,
        None => RollcallConfig::from_json_str(DEMO_CONFIG)?,
    };
    info!(
        "event=cli_start module=cli status=ok code={}",
        rollcall_core::mask_code(&code)
    );

    let store = Arc::new(SqliteStore::new(open_db_in_memory()?));
    let session = ClassSession::new("Algebra I", DEMO_CODE, 0).with_teacher("Ms. Rivera");
    store.insert_session(&session)?;
    for listed in store.list_sessions()? {
        println!("class={} code={}", listed.name, listed.access_code);
    }

    let auth = DemoAuth {
        user: User::new("uid-demo")
            .with_email("kim@school.test")
            .with_display_name("Kim Lee"),
    };
    let resolver = RoleResolver::new(Arc::new(config.role_policy()?));
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);
    let desk = CheckInDesk::new(
        AttendanceRecorder::new(store.clone(), store.clone()),
        presenter.clone(),
        config.messages.clone(),
        resolver.subscribe_user(),
    );

    resolver.run(auth.auth_state()).await;
    println!("role={}", resolver.current());

    desk.set_typed_code(code);
    match desk.submit().await {
        Ok(outcome) => println!("outcome={outcome:?}"),
        Err(err) => println!("check-in failed: {err}"),
    }
    println!(
        "records={}",
        store.attendance_for_session(session.id)?.len()
    );

    rollcall_core::sign_out(&auth, &resolver, presenter.as_ref(), &config.routes).await?;
    println!("role={}", resolver.current());
    Ok(())
}
