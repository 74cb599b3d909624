//! The puma-dev setup pipeline.
//!
//! A fixed, ordered sequence of idempotent steps sharing one mutable
//! options/state record. Steps either run, skip (guard flag false), or
//! abort the whole run. There are no retries and no rollback; files
//! already written stay written.
//!
//! The `cert` flag is two-phase on purpose: on entry it means "the user
//! wants the CA cert handled"; after `verify_cert` it means "a
//! (re)install is still pending". `setup_cert` and `configure_ssl` key
//! off the second meaning.

use anyhow::{bail, Context, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app;
use crate::console::Console;
use crate::env_file::{self, SslCertEntry};
use crate::exec::{self, Exec, SystemExec};
use crate::paths;
use crate::prompt::{Prompt, StdinPrompt};
use crate::ruby_manager;

/// CLI flags, mutated by later steps (`resetup_check` rewrites `setup`,
/// `puma_dev_setup` and `verify_cert` rewrite `cert`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub cert: bool,
    pub force: bool,
    pub setup: bool,
    pub verbose: bool,
}

/// Whether a guarded step actually did anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Ran,
    Skipped,
}

pub struct PumaDev<E: Exec, P: Prompt> {
    opts: Options,
    console: Console,
    exec: E,
    prompt: P,
    home: PathBuf,
    app_root: PathBuf,

    /// OS root certificate the combined bundle is built from.
    pub base_cert: PathBuf,
    /// chruby init script consulted during `.powrc` generation.
    pub chruby_script: PathBuf,

    // Run state, filled in step order.
    cmd: Option<PathBuf>,
    keychain: Option<PathBuf>,
    combined_cert: Option<PathBuf>,
}

impl PumaDev<SystemExec, StdinPrompt> {
    /// Wire up the real pipeline for the app containing the current
    /// working directory.
    pub fn new(opts: Options) -> Result<Self> {
        let home = dirs::home_dir().context("Unable to determine home directory")?;
        let app_root = app::app_root()?;
        Ok(Self::with_parts(opts, home, app_root, SystemExec, StdinPrompt))
    }
}

impl<E: Exec, P: Prompt> PumaDev<E, P> {
    /// Assemble a pipeline from explicit parts. Tests use this to swap
    /// in scripted exec/prompt implementations and a temp home.
    pub fn with_parts(opts: Options, home: PathBuf, app_root: PathBuf, exec: E, prompt: P) -> Self {
        Self {
            console: Console::new(opts.verbose),
            opts,
            exec,
            prompt,
            home,
            app_root,
            base_cert: PathBuf::from(paths::BASE_CERT),
            chruby_script: paths::chruby_script(),
            cmd: None,
            keychain: None,
            combined_cert: None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn keychain(&self) -> Option<&Path> {
        self.keychain.as_deref()
    }

    pub fn combined_cert(&self) -> Option<&Path> {
        self.combined_cert.as_deref()
    }

    pub fn exec(&self) -> &E {
        &self.exec
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Run every step in order. Any abort surfaces as an error with the
    /// first underlying failure message.
    pub fn run(&mut self) -> Result<()> {
        self.pow_conflict_check()?;
        self.puma_dev_check()?;
        self.load_env()?;
        self.resetup_check()?;
        self.puma_dev_setup()?;
        self.find_keychain();
        self.verify_cert()?;
        self.setup_cert()?;
        self.configure_ssl()?;
        self.configure_app();
        self.configure_app_ssl()?;
        self.force_app_ssl()?;
        self.configure_powrc()?;
        self.link_project()?;
        self.restart_puma_dev()?;
        Ok(())
    }

    /// pow and puma-dev fight over the same port and resolver config.
    pub fn pow_conflict_check(&mut self) -> Result<()> {
        if self.exec.lookup("pow").is_none() {
            return Ok(());
        }
        bail!(
            "\nCONFLICT: aborting puma-dev setup because pow is installed\n\
             Please uninstall pow then setup puma-dev.\n\
             See https://github.com/puma/puma-dev"
        );
    }

    pub fn puma_dev_check(&mut self) -> Result<()> {
        match self.exec.lookup("puma-dev") {
            Some(path) => {
                self.cmd = Some(path);
                Ok(())
            }
            None => bail!("Unable to configure puma-dev: not installed"),
        }
    }

    /// Best-effort `.env` load; the app may not have one yet.
    pub fn load_env(&mut self) -> Result<()> {
        env_file::load(&paths::project::env_file(&self.app_root))
    }

    /// When `--setup` is given but the CA cert already exists, ask
    /// before redoing the privileged setup.
    pub fn resetup_check(&mut self) -> Result<StepOutcome> {
        if !(self.opts.setup && self.cert_path().exists()) {
            return Ok(StepOutcome::Skipped);
        }
        self.console.say("puma-dev appears to already be setup.");
        self.opts.setup = self.prompt.confirm("Re-install?")?;
        Ok(StepOutcome::Ran)
    }

    pub fn puma_dev_setup(&mut self) -> Result<StepOutcome> {
        if !self.opts.setup {
            return Ok(StepOutcome::Skipped);
        }
        self.console
            .say("Initial puma-dev setup requires sudo access for DNS settings");
        let cmd = self.cmd()?.to_path_buf();
        self.run_checked(Path::new("sudo"), &[cmd.as_os_str(), OsStr::new("-setup")])?;
        self.console.say("Configuring to run in background...");
        self.run_checked(&cmd, &[OsStr::new("-install")])?;
        self.opts.cert = true;
        // Best effort; a launchd failure only means no auto-start.
        let _ = self.exec.status(&cmd, &[OsStr::new("-launchd")]);
        self.console.say(
            "\nYou'll probably need to reboot before puma-dev runs in the background automatically",
        );
        Ok(StepOutcome::Ran)
    }

    /// First known keychain that exists on disk; none is not an error.
    pub fn find_keychain(&mut self) {
        self.keychain = paths::keychain_candidates(&self.home)
            .into_iter()
            .find(|chain| chain.exists());
    }

    /// Check whether the CA cert is already trusted. A failed check
    /// flips `cert` to "reinstall pending"; a clean check (or a missing
    /// keychain) leaves nothing to do.
    pub fn verify_cert(&mut self) -> Result<StepOutcome> {
        if !self.opts.cert {
            return Ok(StepOutcome::Skipped);
        }
        self.console.say("Verifying Puma-dev CA cert...");
        let cert = self.cert_path();
        let reinstall = match self.keychain.clone() {
            Some(keychain) => {
                let verified = self.exec.status(
                    Path::new("security"),
                    &[
                        OsStr::new("verify-cert"),
                        OsStr::new("-r"),
                        cert.as_os_str(),
                        OsStr::new("-k"),
                        keychain.as_os_str(),
                        OsStr::new("-L"),
                        OsStr::new("-p"),
                        OsStr::new("ssl"),
                    ],
                )?;
                !verified
            }
            None => {
                self.warn_no_keychain();
                false
            }
        };
        self.opts.cert = reinstall;
        Ok(StepOutcome::Ran)
    }

    pub fn setup_cert(&mut self) -> Result<StepOutcome> {
        if !self.opts.cert {
            return Ok(StepOutcome::Skipped);
        }
        let cert = self.cert_path();
        if !cert.exists() {
            bail!(
                "Missing puma-dev cert: {}\nTry setting up puma-dev: radius puma-dev --setup",
                cert.display()
            );
        }
        self.console.say("Adding trusted Puma-dev CA cert...");
        match self.keychain.clone() {
            Some(keychain) => self.run_checked(
                Path::new("security"),
                &[
                    OsStr::new("add-trusted-cert"),
                    OsStr::new("-r"),
                    OsStr::new("trustRoot"),
                    OsStr::new("-p"),
                    OsStr::new("ssl"),
                    OsStr::new("-k"),
                    keychain.as_os_str(),
                    cert.as_os_str(),
                ],
            )?,
            None => self.warn_no_keychain(),
        }
        Ok(StepOutcome::Ran)
    }

    /// Write `~/.ssh/pumadev.pem` = OS roots + "\n" + puma-dev CA.
    /// An existing bundle is kept as-is unless forcing.
    pub fn configure_ssl(&mut self) -> Result<StepOutcome> {
        if !self.opts.cert {
            return Ok(StepOutcome::Skipped);
        }
        self.console.say("\nConfiguring SSL...");
        let combined = paths::combined_cert(&self.home);
        self.combined_cert = Some(combined.clone());
        if combined.exists() && !self.opts.force {
            self.console.say("Using existing custom CA SSL cert for puma-dev");
            return Ok(StepOutcome::Ran);
        }

        let base = self.base_cert.clone();
        if !base.exists() {
            bail!("Missing OS root cert: {}", base.display());
        }
        let base_bytes = fs::read(&base)
            .with_context(|| format!("Unable to read root cert: {}", base.display()))?;
        let cert = self.cert_path();
        let cert_bytes = fs::read(&cert)
            .with_context(|| format!("Unable to read puma-dev cert: {}", cert.display()))?;

        if self.opts.force && combined.exists() {
            fs::remove_file(&combined)
                .with_context(|| format!("Unable to delete stale bundle: {}", combined.display()))?;
        }
        self.console.say("Creating custom CA SSL cert for puma-dev...");
        let mut bundle = base_bytes;
        bundle.push(b'\n');
        bundle.extend_from_slice(&cert_bytes);
        fs::write(&combined, bundle)
            .with_context(|| format!("Unable to write bundle: {}", combined.display()))?;
        Ok(StepOutcome::Ran)
    }

    /// Hook point for app-specific configuration; header only for now.
    pub fn configure_app(&mut self) {
        self.console.say("\nConfiguring app...");
    }

    /// Pin `SSL_CERT_FILE` in `.env` to the combined bundle. Only runs
    /// when `configure_ssl` ran at all (it records the bundle path even
    /// when it keeps an existing bundle).
    pub fn configure_app_ssl(&mut self) -> Result<StepOutcome> {
        let Some(combined) = self.combined_cert.clone() else {
            return Ok(StepOutcome::Skipped);
        };
        let env_path = paths::project::env_file(&self.app_root);
        let contents = fs::read_to_string(&env_path)
            .with_context(|| format!("Unable to read {}", env_path.display()))?;
        let (rewritten, entry) = env_file::set_ssl_cert_file(&contents, &combined)?;
        match entry {
            SslCertEntry::Replaced => self.console.say("Updating SSL_CERT_FILE environment variable"),
            SslCertEntry::Appended => self.console.say("Adding SSL_CERT_FILE environment variable"),
        }
        fs::write(&env_path, rewritten)
            .with_context(|| format!("Unable to write {}", env_path.display()))?;
        Ok(StepOutcome::Ran)
    }

    /// Flip local `http://*.test` URLs to https and re-enable forced SSL.
    pub fn force_app_ssl(&mut self) -> Result<StepOutcome> {
        if !self.opts.force {
            return Ok(StepOutcome::Skipped);
        }
        self.console.say("Enabling local dev SSL by default...");
        let env_path = paths::project::env_file(&self.app_root);
        let contents = fs::read_to_string(&env_path)
            .with_context(|| format!("Unable to read {}", env_path.display()))?;
        fs::write(&env_path, env_file::force_ssl(&contents)?)
            .with_context(|| format!("Unable to write {}", env_path.display()))?;
        Ok(StepOutcome::Ran)
    }

    /// Write the per-project `.powrc` for whichever Ruby manager is
    /// installed. chruby wins over rbenv, rbenv over rvm.
    pub fn configure_powrc(&mut self) -> Result<StepOutcome> {
        let powrc = paths::project::powrc(&self.app_root);
        if powrc.exists() && !self.opts.force {
            self.console.say("Using existing .powrc");
            return Ok(StepOutcome::Skipped);
        }
        let chruby = self.chruby_script.clone();
        match ruby_manager::detect(&self.exec, &chruby) {
            Some(manager) => {
                if let Some(content) = manager.powrc_content(&chruby) {
                    fs::write(&powrc, content)
                        .with_context(|| format!("Unable to write {}", powrc.display()))?;
                }
            }
            None => self
                .console
                .warn("Unknown Ruby version manager. Please install chruby, rbenv, or rvm."),
        }
        Ok(StepOutcome::Ran)
    }

    /// Register the app with puma-dev. Link creation is unconditional
    /// on the cert flags; only a pre-existing link short-circuits it.
    pub fn link_project(&mut self) -> Result<()> {
        self.console.say("\nLinking project...");
        let domain = app::app_domain()?;
        let link_dir = paths::link_dir(&self.home);
        let link_path = paths::app_link(&self.home, &domain);

        if self.opts.force || !link_dir.exists() {
            fs::create_dir_all(&link_dir)
                .with_context(|| format!("Unable to create {}", link_dir.display()))?;
        }
        if self.opts.force && (link_path.is_symlink() || link_path.exists()) {
            self.console.say(&format!(
                "App link exists. Deleting existing link: {}",
                link_path.display()
            ));
            fs::remove_file(&link_path)
                .with_context(|| format!("Unable to delete {}", link_path.display()))?;
        }
        if !link_path.exists() {
            let cmd = self.cmd()?.to_path_buf();
            let root = self.app_root.clone();
            self.run_checked(
                &cmd,
                &[
                    OsStr::new("link"),
                    OsStr::new("-n"),
                    OsStr::new(&domain),
                    root.as_os_str(),
                ],
            )?;
        }
        self.console.say(&format!("Project linked at: {domain}.test"));
        Ok(())
    }

    pub fn restart_puma_dev(&mut self) -> Result<()> {
        self.console.say("Restarting puma-dev...");
        let cmd = self.cmd()?.to_path_buf();
        self.run_checked(&cmd, &[OsStr::new("-stop")])
    }

    fn cmd(&self) -> Result<&Path> {
        self.cmd
            .as_deref()
            .context("puma-dev binary not resolved; run the presence check first")
    }

    fn cert_path(&self) -> PathBuf {
        paths::cert(&self.home)
    }

    fn warn_no_keychain(&self) {
        let list: Vec<String> = paths::keychain_candidates(&self.home)
            .iter()
            .map(|chain| chain.display().to_string())
            .collect();
        self.console
            .warn(&format!("Unable to locate keychain from list: [{}]", list.join(", ")));
    }

    /// `system!` equivalent: abort the run when the command fails.
    fn run_checked(&mut self, program: &Path, args: &[&OsStr]) -> Result<()> {
        if self.exec.status(program, args)? {
            Ok(())
        } else {
            bail!("\n== Command {} failed ==", exec::render_argv(program, args))
        }
    }
}
