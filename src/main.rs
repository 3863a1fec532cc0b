// SPDX-License-Identifier: MPL-2.0
use image_page::app::{self, paths, CgiRequest};
use image_page::config::{self, Config};
use image_page::diagnostics::{DumpStore, Tracer};
use image_page::error::Error;
use image_page::render;
use image_page::version::build_info;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const HELP: &str = "\
page - CGI image viewer page

Reads PREFIX and REQUEST_URI from the environment and writes an HTML page
for the requested image to standard output.

USAGE:
  page [OPTIONS]

OPTIONS:
  --config <FILE>       Settings file (default: <config dir>/settings.toml)
  --config-dir <DIR>    Override the config directory
  --data-dir <DIR>      Override the data directory (holds dumps)
  --list-dumps          List crash dumps and exit
  --clear-dumps         Delete all crash dumps and exit
  -V, --version         Print version information and exit
  -h, --help            Print this help and exit
";

/// Largest request body read for tracing.
const MAX_TRACED_BODY_BYTES: u64 = 64 * 1024;

struct Flags {
    config: Option<PathBuf>,
    config_dir: Option<String>,
    data_dir: Option<String>,
    list_dumps: bool,
    clear_dumps: bool,
    version: bool,
    help: bool,
}

fn parse_flags() -> Result<Flags, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();

    let flags = Flags {
        help: args.contains(["-h", "--help"]),
        version: args.contains(["-V", "--version"]),
        list_dumps: args.contains("--list-dumps"),
        clear_dumps: args.contains("--clear-dumps"),
        config: args.opt_value_from_str("--config")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        data_dir: args.opt_value_from_str("--data-dir")?,
    };

    let remaining = args.finish();
    if let Some(extra) = remaining.first() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected argument: {}", extra.to_string_lossy()),
        });
    }
    Ok(flags)
}

/// Reads the CGI environment and, for requests with a body, the body itself.
fn read_cgi_request() -> CgiRequest {
    let vars: Vec<(String, String)> = std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect();

    let content_length = vars
        .iter()
        .find(|(name, _)| name == "CONTENT_LENGTH")
        .and_then(|(_, value)| value.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let mut request = CgiRequest::from_vars(vars);
    if content_length > 0 {
        let mut body = Vec::new();
        let limit = content_length.min(MAX_TRACED_BODY_BYTES);
        match std::io::stdin().take(limit).read_to_end(&mut body) {
            Ok(_) => request.body = Some(body),
            Err(err) => log::warn!("could not read request body: {}", err),
        }
    }
    request
}

fn list_dumps(dumps: &DumpStore) -> ExitCode {
    match dumps.list() {
        Ok(list) => {
            for dump in list {
                match dump.info() {
                    Ok(info) => println!(
                        "{}  {}.{}  {}",
                        dump.name(),
                        info.package,
                        info.function,
                        info.message
                    ),
                    Err(err) => println!("{}  (unreadable: {})", dump.name(), err),
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("page: could not list dumps in {}: {}", dumps.root().display(), err);
            ExitCode::FAILURE
        }
    }
}

fn clear_dumps(dumps: &DumpStore) -> ExitCode {
    match dumps.clear() {
        Ok(count) => {
            println!("removed {} dump(s) from {}", count, dumps.root().display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("page: could not clear dumps in {}: {}", dumps.root().display(), err);
            ExitCode::FAILURE
        }
    }
}

/// Handles the request and writes the CGI response to stdout.
fn serve(cgi: &CgiRequest, config: &Config, tracer: &Tracer) -> ExitCode {
    let mut response = String::from("Content-type: text/html\n\n");

    let status = match app::handle_request(cgi, config, tracer) {
        Ok(page) => {
            response.push_str(&page.body());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let (code, message) = match &err {
                Error::Request(request_err) => (request_err.code(), request_err.to_string()),
                other => ("internal", other.to_string()),
            };
            let trace = tracer.package("main").function("serve");
            trace.error(format!("[{}] {}", code, message));

            if config.diagnostics.dump_on_error {
                match trace.dump(format!("[{}] {}", code, message)) {
                    Ok(dump) => {
                        if let Some(uri) = &cgi.request_uri {
                            if let Err(err) = dump.add_bytes("request_uri.txt", uri.as_bytes()) {
                                log::warn!("could not attach request to dump: {}", err);
                            }
                        }
                    }
                    Err(err) => log::warn!("could not write dump: {}", err),
                }
            }

            let cwd = std::env::current_dir().ok();
            response.push_str(&render::render_error_page(
                &message,
                build_info(),
                cwd.as_deref(),
            ));
            ExitCode::FAILURE
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(err) = stdout
        .write_all(response.as_bytes())
        .and_then(|()| stdout.flush())
    {
        log::error!("could not write response: {}", err);
        return ExitCode::FAILURE;
    }
    status
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let flags = match parse_flags() {
        Ok(flags) => flags,
        Err(err) => {
            eprintln!("page: {}\n\n{}", err, HELP);
            return ExitCode::from(2);
        }
    };

    if flags.help {
        print!("{}", HELP);
        return ExitCode::SUCCESS;
    }
    if flags.version {
        let info = build_info();
        println!(
            "page {} ({} {}, built {})",
            info.version, info.git_branch, info.git_commit, info.build_date
        );
        return ExitCode::SUCCESS;
    }

    paths::init_cli_overrides(flags.data_dir, flags.config_dir);

    let (config, warning) = config::load_with_override(flags.config);
    if let Some(warning) = warning {
        log::warn!("{}", warning);
    }

    let dumps = DumpStore::new(config.diagnostics.dump_root());
    if flags.list_dumps {
        return list_dumps(&dumps);
    }
    if flags.clear_dumps {
        return clear_dumps(&dumps);
    }

    let tracer = match Tracer::open(&config.diagnostics, dumps.clone()) {
        Ok(tracer) => tracer,
        Err(err) => {
            log::warn!("could not open trace file, tracing to stderr only: {}", err);
            Tracer::new(&config.diagnostics, dumps)
        }
    };

    let cgi = read_cgi_request();
    let code = serve(&cgi, &config, &tracer);

    if let Err(err) = tracer.close() {
        log::warn!("could not close trace file: {}", err);
    }
    code
}
