//! Driver provisioning: locate and start the native WebDriver binary.
//!
//! Resolution order for the driver binary: the kind's environment-variable
//! override (`CHROMEDRIVER` / `GECKODRIVER` / `MSEDGEDRIVER`), then a
//! `PATH` search. The resolved binary is spawned on the kind's
//! conventional port and readiness is confirmed by a bounded TCP probe.
//!
//! Provisioning either succeeds or returns a typed error; there is no
//! retry and no recovery here. The spawned process is owned by the
//! returned [`DriverServer`] and killed when that handle drops.

use std::ffi::OsStr;
use std::net::{SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::browser::BrowserKind;
use crate::result::{PulsarError, PulsarResult};

/// How long to wait for a freshly spawned driver to accept connections
const STARTUP_BUDGET: Duration = Duration::from_secs(10);

/// Interval between readiness probes
const PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// A running WebDriver server owned by this process.
///
/// Dropping the handle kills the child process and reaps it.
#[derive(Debug)]
pub struct DriverServer {
    child: Child,
    url: String,
    binary: PathBuf,
}

impl DriverServer {
    /// Endpoint URL the driver listens on
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path of the spawned driver binary
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Drop for DriverServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Resolve the driver binary for `kind`, spawn it, and wait until it
/// accepts connections.
///
/// # Errors
///
/// Returns [`PulsarError::Provision`] when the binary cannot be found,
/// fails to spawn, or never becomes ready within the startup budget.
pub async fn ensure_driver(kind: BrowserKind) -> PulsarResult<DriverServer> {
    let binary = resolve_binary(kind)?;
    let port = kind.default_port();

    debug!(
        target: "pulsar",
        binary = %binary.display(),
        port,
        "starting driver"
    );

    let child = Command::new(&binary)
        .args(port_args(kind, port))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| PulsarError::Provision {
            binary: kind.driver_binary().to_string(),
            message: format!("failed to spawn {}: {e}", binary.display()),
        })?;

    let url = format!("http://localhost:{port}");
    let mut server = DriverServer { child, url, binary };

    wait_ready(kind, &mut server, port).await?;

    info!(
        target: "pulsar",
        browser = %kind,
        url = %server.url,
        "driver ready"
    );
    Ok(server)
}

/// Argument shape differs per driver: chromedriver and msedgedriver take
/// `--port=N`, geckodriver takes `--port N`.
fn port_args(kind: BrowserKind, port: u16) -> Vec<String> {
    match kind {
        BrowserKind::Chrome | BrowserKind::Edge => vec![format!("--port={port}")],
        BrowserKind::Firefox => vec!["--port".to_string(), port.to_string()],
    }
}

async fn wait_ready(kind: BrowserKind, server: &mut DriverServer, port: u16) -> PulsarResult<()> {
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let deadline = Instant::now() + STARTUP_BUDGET;

    loop {
        if TcpStream::connect_timeout(&addr, PROBE_INTERVAL).is_ok() {
            return Ok(());
        }
        // a dead child will never start listening
        if let Ok(Some(status)) = server.child.try_wait() {
            return Err(PulsarError::Provision {
                binary: kind.driver_binary().to_string(),
                message: format!("driver exited during startup with {status}"),
            });
        }
        if Instant::now() >= deadline {
            return Err(PulsarError::Provision {
                binary: kind.driver_binary().to_string(),
                message: format!("driver did not accept connections on port {port} within {}s", STARTUP_BUDGET.as_secs()),
            });
        }
        tokio::time::sleep(PROBE_INTERVAL).await;
    }
}

fn resolve_binary(kind: BrowserKind) -> PulsarResult<PathBuf> {
    // 1. explicit override
    if let Some(path) = std::env::var_os(kind.driver_env_override()) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(path);
        }
        return Err(PulsarError::Provision {
            binary: kind.driver_binary().to_string(),
            message: format!(
                "{} points at {}, which does not exist",
                kind.driver_env_override(),
                path.display()
            ),
        });
    }

    // 2. PATH search
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    find_in_path(kind.driver_binary(), &path_var).ok_or_else(|| PulsarError::Provision {
        binary: kind.driver_binary().to_string(),
        message: format!(
            "not found on PATH; install it or set {}",
            kind.driver_env_override()
        ),
    })
}

fn find_in_path(binary: &str, path_var: &OsStr) -> Option<PathBuf> {
    let name = if cfg!(windows) {
        format!("{binary}.exe")
    } else {
        binary.to_string()
    };
    std::env::split_paths(path_var)
        .map(|dir| dir.join(&name))
        .find(|candidate| candidate.is_file())
}
