// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! crumbline CLI
//!
//! Smoke-test tool for build-server APIs built on the crumbline library.

use std::env;
use std::process::ExitCode;

use crumbline::{Error, Form, Headers, HttpClient, PostOptions, RequestHandle};

/// Job listing query used by `jobs`
const JOBS_TREE: &str = "jobs%5Bname,fullName,url,buildable,inQueue,description%5D";

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crumbline=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let options = match Options::parse(&args[2..]) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let client = match HttpClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return ExitCode::from(1);
        }
    };

    match args[1].as_str() {
        "get" => {
            let Some(url) = options.positional.first() else {
                eprintln!("Usage: crumbline get <url> [--user USER:PASS] [-H NAME:VALUE]");
                return ExitCode::from(1);
            };
            run(client.get(url, options.headers)).await
        }
        "post" => {
            let Some(url) = options.positional.first() else {
                eprintln!("Usage: crumbline post <url> [--form KEY=VALUE]... [--data BODY]");
                return ExitCode::from(1);
            };
            let mut post = PostOptions::new(url.as_str()).headers(options.headers);
            if !options.form.is_empty() {
                post = post.form(options.form);
            } else if let Some(data) = options.data {
                post = post.body(data);
            }
            run(client.post(post)).await
        }
        "jobs" => {
            let Some(server) = options.positional.first() else {
                eprintln!("Usage: crumbline jobs <server-url> [--user USER:PASS]");
                return ExitCode::from(1);
            };
            let url = format!("{}/api/json?tree={}", server.trim_end_matches('/'), JOBS_TREE);
            run(client.get(url, options.headers)).await
        }
        "script" => {
            let (Some(server), Some(script)) =
                (options.positional.first(), options.positional.get(1))
            else {
                eprintln!("Usage: crumbline script <server-url> <script> [--user USER:PASS]");
                return ExitCode::from(1);
            };
            let url = format!("{}/scriptText", server.trim_end_matches('/'));
            run(client.post(
                PostOptions::new(url)
                    .headers(options.headers)
                    .form([("script", script.as_str())]),
            ))
            .await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("crumbline {}", crumbline::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"crumbline - HTTP client for build-server APIs

USAGE:
    crumbline <COMMAND> [OPTIONS]

COMMANDS:
    get <url>                    GET a URL and print the body
    post <url>                   POST to a URL and print the body
    jobs <server-url>            List jobs on a server
    script <server-url> <code>   Run a script through /scriptText
    help                         Show this help message
    version                      Show version information

OPTIONS:
    --user USER:PASS     Send Basic credentials (enables crumb negotiation)
    -H NAME:VALUE        Add a request header
    --form KEY=VALUE     Add a form field (post)
    --data BODY          Send a raw body (post)

EXAMPLES:
    crumbline jobs http://localhost:18080 --user admin:admin
    crumbline script http://localhost:18080 'println("hello")' --user admin:admin
    crumbline post http://localhost:18080/job/demo/build --user admin:admin
"#
    );
}

/// Await a request, aborting it on Ctrl-C
async fn run(handle: RequestHandle) -> ExitCode {
    let abort = handle.abort_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, aborting request");
            abort.abort();
        }
    });

    let result = handle.await;
    ctrl_c.abort();

    match result {
        Ok(body) => {
            tracing::info!(bytes = body.len(), "Request succeeded");
            println!("{}", body);
            ExitCode::SUCCESS
        }
        Err(Error::Http { status, body }) => {
            eprintln!("Server returned HTTP {}", status);
            if !body.is_empty() {
                eprintln!("{}", body);
            }
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Options shared by all commands
#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    headers: Headers,
    form: Form,
    data: Option<String>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = Options::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("Missing value for {}", flag))
            };

            match arg.as_str() {
                "--user" | "-u" => {
                    let creds = value(arg.as_str())?;
                    let (user, pass) = creds.split_once(':').unwrap_or((creds.as_str(), ""));
                    options.headers = options.headers.with_basic_auth(user, pass);
                }
                "--header" | "-H" => {
                    let header = value(arg.as_str())?;
                    let (name, val) = header
                        .split_once(':')
                        .ok_or_else(|| format!("Header must be NAME:VALUE, got '{}'", header))?;
                    options.headers = options.headers.with(name.trim(), val.trim());
                }
                "--form" | "-F" => {
                    let field = value(arg.as_str())?;
                    let (name, val) = field
                        .split_once('=')
                        .ok_or_else(|| format!("Form field must be KEY=VALUE, got '{}'", field))?;
                    options.form = options.form.field(name, val);
                }
                "--data" | "-d" => {
                    options.data = Some(value(arg.as_str())?);
                }
                _ => options.positional.push(arg.clone()),
            }
        }

        Ok(options)
    }
}
