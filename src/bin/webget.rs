use std::env;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::process::ExitCode;

/// Fetch `path` from `host` over HTTP/1.0 and stream the response to
/// stdout.
fn get_url(host: &str, path: &str) -> io::Result<()> {
    let mut socket = TcpStream::connect((host, 80))?;
    write!(
        socket,
        "GET {path} HTTP/1.0\r\nHost: {host}\r\nConnection: close\r\n\r\n"
    )?;

    let mut stdout = io::stdout().lock();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf)?;
        if n == 0 {
            break;
        }
        stdout.write_all(&buf[..n])?;
    }
    stdout.flush()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        let prog = args.first().map(String::as_str).unwrap_or("webget");
        eprintln!("Usage: {prog} HOST PATH");
        eprintln!("\tExample: {prog} stanford.edu /class/cs144");
        return ExitCode::FAILURE;
    }

    match get_url(&args[1], &args[2]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
