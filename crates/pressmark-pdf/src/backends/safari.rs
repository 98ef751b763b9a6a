//! Safari backend driven through macOS automation
//!
//! Safari loads the document asynchronously, so the backend polls the page's
//! ready state under the load policy and exports whatever is rendered when
//! the budget runs out.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::backend::{
    BackendOutput, PdfBackend, RenderError, RenderJob, RenderOptions, RenderResult,
};
use crate::process::{absolute, file_url, find_program, run_with_timeout, StdoutTarget};
use crate::wait::{await_load, WaitPolicy};

/// Fixed wait used when the page cannot report its ready state
const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Control surface over a Safari instance
///
/// Split out so the load-wait logic can be exercised without a browser.
pub trait SafariDriver: Send + Sync {
    /// Whether Safari and its automation bridge exist on this host
    fn is_present(&self) -> bool;

    /// Open `url` in a new document
    fn open(&self, url: &str) -> RenderResult<()>;

    /// `document.readyState` of the front document
    fn ready_state(&self) -> RenderResult<String>;

    /// Export the front document as PDF to `output`
    fn export_pdf(&self, output: &Path) -> RenderResult<()>;

    /// Close the front document
    fn close(&self) -> RenderResult<()>;
}

/// Driver that runs AppleScript through `osascript`
#[derive(Debug, Clone)]
pub struct OsaScriptDriver {
    /// Budget for a single script
    pub script_timeout: Duration,
}

impl Default for OsaScriptDriver {
    fn default() -> Self {
        Self {
            script_timeout: Duration::from_secs(20),
        }
    }
}

impl OsaScriptDriver {
    fn run(&self, script: &str) -> RenderResult<String> {
        let mut cmd = Command::new("osascript");
        cmd.arg("-e").arg(script);
        let policy = WaitPolicy::new(Duration::from_millis(50), self.script_timeout);
        let output = run_with_timeout(&mut cmd, StdoutTarget::Capture, &policy)?
            .ensure_success("osascript")?;
        Ok(output.stdout.trim().to_string())
    }
}

impl SafariDriver for OsaScriptDriver {
    fn is_present(&self) -> bool {
        cfg!(target_os = "macos")
            && Path::new("/Applications/Safari.app").exists()
            && find_program("osascript").is_some()
    }

    fn open(&self, url: &str) -> RenderResult<()> {
        self.run(&format!(
            "tell application \"Safari\" to make new document with properties {{URL:\"{}\"}}",
            applescript_string(url)
        ))
        .map(|_| ())
    }

    fn ready_state(&self) -> RenderResult<String> {
        self.run(
            "tell application \"Safari\" to do JavaScript \"document.readyState\" in front document",
        )
    }

    fn export_pdf(&self, output: &Path) -> RenderResult<()> {
        let dir = output
            .parent()
            .ok_or_else(|| RenderError::RenderFailed("output has no parent directory".to_string()))?;
        let file_name = output
            .file_name()
            .ok_or_else(|| RenderError::RenderFailed("output has no file name".to_string()))?;

        let script = format!(
            r#"tell application "Safari" to activate
tell application "System Events"
    tell process "Safari"
        click menu item "Export as PDF…" of menu "File" of menu bar 1
        repeat until exists sheet 1 of window 1
            delay 0.1
        end repeat
        set value of text field 1 of sheet 1 of window 1 to "{name}"
        keystroke "g" using {{command down, shift down}}
        delay 0.5
        keystroke "{dir}"
        keystroke return
        delay 0.5
        click button "Save" of sheet 1 of window 1
    end tell
end tell"#,
            name = applescript_string(&file_name.to_string_lossy()),
            dir = applescript_string(&dir.to_string_lossy()),
        );
        self.run(&script).map(|_| ())
    }

    fn close(&self) -> RenderResult<()> {
        self.run("tell application \"Safari\" to close front document")
            .map(|_| ())
    }
}

/// Quote text for an AppleScript string literal
fn applescript_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Loads the staged HTML in Safari and exports it
pub struct SafariBackend {
    driver: Box<dyn SafariDriver>,
}

impl Default for SafariBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SafariBackend {
    /// Backend using AppleScript automation
    pub fn new() -> Self {
        Self::with_driver(Box::new(OsaScriptDriver::default()))
    }

    /// Backend using a custom driver
    pub fn with_driver(driver: Box<dyn SafariDriver>) -> Self {
        Self { driver }
    }

    fn export_open_document(
        &self,
        job: &RenderJob,
        options: &RenderOptions,
    ) -> RenderResult<BackendOutput> {
        let policy = options.load_policy();
        let mut produced = BackendOutput::new();

        // A refused probe (JavaScript from Apple Events disabled) stops polling
        let mut refused = None;
        let note = await_load(&policy, "Safari page", || match self.driver.ready_state() {
            Ok(state) => Ok::<_, RenderError>(state == "complete"),
            Err(e) => {
                refused = Some(e);
                Ok(true)
            }
        })?;
        if let Some(e) = refused {
            let settle = SETTLE_DELAY.min(policy.timeout);
            tracing::warn!("Safari readiness probe failed, settling for {:?}: {}", settle, e);
            std::thread::sleep(settle);
            produced = produced.with_diagnostic(format!(
                "readiness probe unavailable ({}); exported after {:.1}s settle delay",
                e,
                settle.as_secs_f64()
            ));
        } else if let Some(note) = note {
            produced = produced.with_diagnostic(note);
        }

        let output = absolute(job.output())?;
        self.driver.export_pdf(&output)?;

        // The save sheet finishes asynchronously
        let written = policy.wait_for(|| {
            Ok::<_, RenderError>(
                fs::metadata(&output)
                    .ok()
                    .filter(|meta| meta.len() > 0)
                    .map(|meta| meta.len()),
            )
        })?;
        if !written.is_ready() {
            return Err(RenderError::RenderFailed(format!(
                "export did not appear within {:.1}s",
                written.elapsed().as_secs_f64()
            )));
        }
        Ok(produced)
    }
}

impl PdfBackend for SafariBackend {
    fn name(&self) -> &'static str {
        "safari"
    }

    fn is_available(&self) -> bool {
        self.driver.is_present()
    }

    fn availability_hint(&self) -> String {
        "Safari automation requires macOS with osascript".to_string()
    }

    fn attempt(&self, job: &RenderJob, options: &RenderOptions) -> RenderResult<BackendOutput> {
        self.driver.open(&file_url(&job.html_path)?)?;

        let result = self.export_open_document(job, options);
        if let Err(e) = self.driver.close() {
            tracing::warn!("could not close Safari document: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressmark_core::ComposedDocument;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    #[derive(Default)]
    struct FakeDriver {
        loads_after: Option<usize>,
        probe_refused: bool,
        export_bytes: Option<usize>,
        log: Arc<Mutex<Vec<String>>>,
        polls: Mutex<usize>,
    }

    impl SafariDriver for FakeDriver {
        fn is_present(&self) -> bool {
            true
        }

        fn open(&self, url: &str) -> RenderResult<()> {
            self.log.lock().unwrap().push(format!("open {}", url));
            Ok(())
        }

        fn ready_state(&self) -> RenderResult<String> {
            if self.probe_refused {
                return Err(RenderError::Process(
                    "Safari: You must enable 'Allow JavaScript from Apple Events'".to_string(),
                ));
            }
            let mut polls = self.polls.lock().unwrap();
            *polls += 1;
            let loaded = self.loads_after.is_some_and(|n| *polls >= n);
            Ok(if loaded { "complete" } else { "loading" }.to_string())
        }

        fn export_pdf(&self, output: &Path) -> RenderResult<()> {
            self.log.lock().unwrap().push("export".to_string());
            match self.export_bytes {
                Some(n) => Ok(fs::write(output, vec![b'%'; n])?),
                None => Err(RenderError::Process("menu item missing".to_string())),
            }
        }

        fn close(&self) -> RenderResult<()> {
            self.log.lock().unwrap().push("close".to_string());
            Ok(())
        }
    }

    fn job(dir: &tempfile::TempDir) -> RenderJob {
        let doc = ComposedDocument {
            title: "T".to_string(),
            html: String::new(),
        };
        RenderJob::new(doc, dir.path().join("doc.html"), dir.path().join("doc.pdf"))
    }

    fn fast_options() -> RenderOptions {
        RenderOptions::default()
            .with_poll_interval(Duration::from_millis(5))
            .with_load_timeout(Duration::from_millis(150))
    }

    #[test]
    fn test_exports_after_load() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let backend = SafariBackend::with_driver(Box::new(FakeDriver {
            loads_after: Some(3),
            export_bytes: Some(2000),
            log: log.clone(),
            ..FakeDriver::default()
        }));

        let produced = backend.attempt(&job(&dir), &fast_options()).unwrap();

        assert!(produced.diagnostics.is_empty());
        let log = log.lock().unwrap();
        assert!(log[0].starts_with("open file://"));
        assert_eq!(&log[1..], ["export", "close"]);
    }

    #[test]
    fn test_never_loading_page_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SafariBackend::with_driver(Box::new(FakeDriver {
            loads_after: None,
            export_bytes: Some(2000),
            ..FakeDriver::default()
        }));

        let start = Instant::now();
        let produced = backend.attempt(&job(&dir), &fast_options()).unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(produced.diagnostics.len(), 1);
        assert!(produced.diagnostics[0].contains("did not finish loading"));
        assert!(dir.path().join("doc.pdf").exists());
    }

    #[test]
    fn test_refused_probe_still_exports() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let backend = SafariBackend::with_driver(Box::new(FakeDriver {
            probe_refused: true,
            export_bytes: Some(2000),
            log: log.clone(),
            ..FakeDriver::default()
        }));

        let start = Instant::now();
        let produced = backend.attempt(&job(&dir), &fast_options()).unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(dir.path().join("doc.pdf").exists());
        assert_eq!(&log.lock().unwrap()[1..], ["export", "close"]);
        assert_eq!(produced.diagnostics.len(), 1);
        assert!(produced.diagnostics[0].contains("readiness probe unavailable"));
    }

    #[test]
    fn test_closes_after_failed_export() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let backend = SafariBackend::with_driver(Box::new(FakeDriver {
            loads_after: Some(1),
            export_bytes: None,
            log: log.clone(),
            ..FakeDriver::default()
        }));

        let result = backend.attempt(&job(&dir), &fast_options());

        assert!(matches!(result, Err(RenderError::Process(_))));
        assert_eq!(log.lock().unwrap().last().map(String::as_str), Some("close"));
    }

    #[test]
    fn test_applescript_string() {
        assert_eq!(applescript_string(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }
}
