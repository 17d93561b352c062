//! Simple inspector for ObjectId hex strings.
//!
//! Usage:
//!   cargo run --example inspect_id -- 65f4a2c81111111111111111 ...
//!   cargo run --example inspect_id -- --since 2024-03-15T14:30:00Z
//!
//! With no arguments, generates a fresh id and inspects it.

use bsondoc::util::parse_datetime_rfc3339;
use bsondoc::ObjectId;

fn inspect(id: &ObjectId) {
    let unique = id.process_unique();
    println!("{}", id);
    println!("  Timestamp:      {} ({})", id.timestamp(), id.datetime_rfc3339());
    println!(
        "  Process unique: {:02x}{:02x}{:02x}{:02x}{:02x}",
        unique[0], unique[1], unique[2], unique[3], unique[4]
    );
    println!("  Counter:        {}", id.counter());
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() {
        inspect(&ObjectId::new());
        return;
    }

    if args[0] == "--since" {
        let Some(datetime) = args.get(1) else {
            eprintln!("--since requires an RFC 3339 datetime");
            std::process::exit(2);
        };
        let epoch_ms = match parse_datetime_rfc3339(datetime) {
            Ok(ms) => ms,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(2);
            }
        };
        let Ok(secs) = u32::try_from(epoch_ms.div_euclid(1000)) else {
            eprintln!("{} is outside the ObjectId timestamp range", datetime);
            std::process::exit(2);
        };
        println!("Lower bound for ids created at or after {}:", datetime);
        inspect(&ObjectId::from_timestamp(secs));
        return;
    }

    let mut failed = false;
    for arg in &args {
        match ObjectId::from_hex(arg) {
            Ok(id) => inspect(&id),
            Err(e) => {
                eprintln!("{}", e);
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}
