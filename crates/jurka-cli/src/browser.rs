use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlOpenCommand {
    pub program: PathBuf,
    pub prefix_args: Vec<OsString>,
}

impl UrlOpenCommand {
    pub fn for_os(target_os: &str) -> Result<Self> {
        match target_os {
            "macos" => Ok(Self {
                program: PathBuf::from("open"),
                prefix_args: Vec::new(),
            }),
            "linux" | "freebsd" | "openbsd" | "netbsd" => Ok(Self {
                program: PathBuf::from("xdg-open"),
                prefix_args: Vec::new(),
            }),
            "windows" => Ok(Self {
                program: PathBuf::from("cmd"),
                prefix_args: vec![
                    OsString::from("/C"),
                    OsString::from("start"),
                    OsString::from(""),
                ],
            }),
            _ => bail!("opening URLs is unsupported on `{target_os}`"),
        }
    }

    /// A named browser: `open -a NAME` on macOS, the browser binary elsewhere.
    pub fn named(target_os: &str, browser: &str) -> Result<Self> {
        if target_os == "macos" {
            return Ok(Self {
                program: PathBuf::from("open"),
                prefix_args: vec![OsString::from("-a"), OsString::from(browser)],
            });
        }
        let program =
            which::which(browser).with_context(|| format!("browser '{browser}' not found"))?;
        Ok(Self {
            program,
            prefix_args: Vec::new(),
        })
    }

    pub fn args_for(&self, url: &str) -> Vec<OsString> {
        let mut args = self.prefix_args.clone();
        args.push(OsString::from(url));
        args
    }

    fn run(&self, url: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(self.args_for(url))
            .status()
            .with_context(|| format!("launch {}", self.program.display()))?;
        if !status.success() {
            bail!("{} exited with {status}", self.program.display());
        }
        Ok(())
    }
}

/// Open `url`, falling back to the platform default when a named browser fails.
pub fn open_url(url: &str, browser: Option<&str>) -> Result<()> {
    let os = std::env::consts::OS;
    if let Some(browser) = browser {
        match UrlOpenCommand::named(os, browser).and_then(|command| command.run(url)) {
            Ok(()) => return Ok(()),
            Err(err) => warn!(browser, error = %err, "named browser failed; using default"),
        }
    }
    UrlOpenCommand::for_os(os)?.run(url)
}
