//! Basic errinfo example
//!
//! Walks through the capture levels, embedding, more-info text, changing
//! the default level and assertion errors.
//!
//! # Environment Variables
//!
//! - `ERRINFO_CALLSTACK=full` - default capture level (none, caller, full)
//! - `ERRINFO_SKIP=<n>` - extra frames to skip when capturing
//! - `RUST_LOG=trace` - show the library's own diagnostics

use errinfo::{Annotation, AnnotatedError, CaptureLevel, ResultExt, Sentinel};
use log::info;

const ERR_TEST1: Sentinel = Sentinel::new("Test1", 1001);
const ERR_TEST2: Sentinel = Sentinel::new("Test2", 1002);
const ERR_TEST3: Sentinel = Sentinel::new("Test3", 1003);
const ERR_TEST4: Sentinel = Sentinel::new("Test4", 1004);
const ERR_TEST5: Sentinel = Sentinel::new("Test5", 1005);
const ERR_CONFIG: Sentinel = Sentinel::new("config unreadable", 1006);

fn read_config(path: &str) -> errinfo::Result<String> {
    std::fs::read_to_string(path).annotate(ERR_CONFIG, [Annotation::info("path", path)])
}

fn check_port(port: u16) -> errinfo::Result<u16> {
    errinfo::ensure!(port >= 1024, "privileged port", "port" => port);
    Ok(port)
}

// RUST_LOG=debug ERRINFO_CALLSTACK=caller cargo run -p errinfo-basic
fn main() {
    env_logger::init();
    errinfo::init_from_env();

    println!("=== errinfo Basic Example ===\n");

    let e1 = errinfo::new(ERR_TEST1, [Annotation::Level(CaptureLevel::None)]);
    println!("{}", e1);

    let e2 = errinfo::new(ERR_TEST2, []);
    println!("{}", e2);

    let e3 = errinfo::new(ERR_TEST3, errinfo::parse_tokens(&["$fullcs", "where", "here"]));
    println!("{}", e3);

    let e4 = errinfo::embed(
        ERR_TEST4,
        "inner error",
        [
            Annotation::info("who", "me"),
            Annotation::more_info("detail comes first"),
        ],
    );
    println!("{}", e4);

    errinfo::set_default_level(CaptureLevel::Full);
    let e5 = AnnotatedError::new(ERR_TEST5, []);
    println!("{}", e5);

    let e6 = errinfo::new_assert([Annotation::info("err", "test")]);
    println!("{}", e6);

    errinfo::set_default_level(CaptureLevel::Caller);

    match read_config("/nonexistent/errinfo.toml") {
        Ok(_) => info!("config unexpectedly present"),
        Err(err) => {
            let err = errinfo::add_info(err, [Annotation::info("phase", "startup")]);
            info!("config error is not-exist: {}", err.is_not_exist());
            println!("{}", err);
        }
    }

    if let Err(err) = check_port(80) {
        println!("{}", err);
    }

    println!("\n=== Example Complete ===");
}
