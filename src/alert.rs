//! Growth alerts by email.
//!
//! Messages are handed to the local MTA through `sendmail -t`, which reads
//! the recipients from the headers. Delivery problems are returned to the
//! caller; nothing is retried.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::config::AlertConfig;
use crate::error::{AlertError, Result};
use crate::report::Sink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Alert {
    pub fn new(config: &AlertConfig, body: String) -> Self {
        Alert {
            from: config.from.clone(),
            to: config.to.clone(),
            subject: config.subject.clone(),
            body,
        }
    }

    /// Plain text RFC 5322 message
    pub fn to_message(&self) -> String {
        let mut message = String::new();
        message.push_str(&format!("From: {}\r\n", self.from));
        message.push_str(&format!("To: {}\r\n", self.to));
        message.push_str(&format!("Subject: {}\r\n", self.subject));
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        message.push_str("\r\n");
        for line in self.body.lines() {
            message.push_str(line);
            message.push_str("\r\n");
        }
        message
    }
}

pub trait AlertDispatcher {
    fn dispatch(&self, alert: &Alert) -> Result<(), AlertError>;
}

pub struct SendmailDispatcher {
    program: PathBuf,
}

impl SendmailDispatcher {
    pub fn new(program: PathBuf) -> Self {
        SendmailDispatcher { program }
    }
}

impl AlertDispatcher for SendmailDispatcher {
    fn dispatch(&self, alert: &Alert) -> Result<(), AlertError> {
        let program = self.program.display().to_string();
        let spawn_err = |source: std::io::Error| AlertError::Spawn {
            program: program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .arg("-t")
            .arg("-oi")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(alert.to_message().as_bytes()).map_err(spawn_err)?;
        }

        let output = child.wait_with_output().map_err(spawn_err)?;
        if !output.status.success() {
            return Err(AlertError::Rejected {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        log::info!("alert sent to {}", alert.to);
        Ok(())
    }
}

/// Sink that mails the rendered report instead of printing it
pub struct AlertSink<'a> {
    dispatcher: &'a dyn AlertDispatcher,
    config: &'a AlertConfig,
}

impl<'a> AlertSink<'a> {
    pub fn new(dispatcher: &'a dyn AlertDispatcher, config: &'a AlertConfig) -> Self {
        AlertSink { dispatcher, config }
    }
}

impl Sink for AlertSink<'_> {
    fn color(&self) -> bool {
        false
    }

    fn deliver(&mut self, lines: &[String]) -> Result<()> {
        let alert = Alert::new(self.config, lines.join("\n"));
        self.dispatcher.dispatch(&alert)?;
        Ok(())
    }
}
