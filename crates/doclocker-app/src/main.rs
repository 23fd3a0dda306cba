// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Doclocker: personal document locker.
//
// Entry point. Initialises logging and the backend services, then optionally
// signs in, stores the files named on the command line, and lists the view:
//
//     doclocker [<email> <password> [--category <name|all>] [<file>...]]

use std::process::ExitCode;

use doclocker_app::LockerServices;
use doclocker_core::file::{FileHandle, PathFile};
use doclocker_core::human_errors::humanize_error;
use doclocker_core::types::{CategoryFilter, DocumentFilter, format_file_size};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Doclocker starting");

    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let human = humanize_error(&e);
            tracing::error!(error = %e, "{}", human.message);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> doclocker_core::error::Result<()> {
    let services = LockerServices::init()?;

    let [email, password, files @ ..] = args.as_slice() else {
        if let Some(dir) = services.data_dir() {
            tracing::info!(path = %dir.display(), "locker ready; pass <email> <password> [--category <name|all>] [<file>...] to use it");
        }
        return Ok(());
    };

    let (view, files) = match files {
        [flag, name, rest @ ..] if flag == "--category" => {
            (DocumentFilter::new("", name.parse::<CategoryFilter>()?), rest)
        }
        _ => (DocumentFilter::default(), files),
    };

    let identity = services.sign_in(email, password)?;
    tracing::info!(email = %identity.email, "signed in as {}", identity.display_name);

    for path in files {
        let file = PathFile::open(path)?;
        let record = services.upload_into_view(Some(&file as &dyn FileHandle), &view)?;
        tracing::info!(document_id = %record.id(), category = record.category().as_str(), "stored {}", record.name());
    }

    for doc in services.list_visible_documents(&view)? {
        println!(
            "{}  {}  {:<10}  {:<11}  {:>10}  {}",
            doc.id(),
            doc.uploaded_at().date_naive(),
            doc.category().as_str(),
            format!("{:?}", doc.kind()),
            format_file_size(doc.size()),
            doc.name()
        );
    }
    let stats = services.dashboard_stats(&view)?;
    println!(
        "{} document(s), {} categories, {}",
        stats.total_documents,
        stats.distinct_categories,
        format_file_size(stats.total_bytes)
    );

    services.sign_out()
}
