use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;
use tracing::debug;

use crate::DeliveryMessage;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to hand off message: {0}")]
    Io(#[from] io::Error),
}

/// 將訊息交給外部郵件通道；送達與否無法觀察。 / Hands a message to an external mail channel. Delivery is not observable.
pub trait DeliveryTransport {
    fn hand_off(&mut self, message: &DeliveryMessage) -> Result<(), TransportError>;
}

/// Writes the `mailto:` URI, one per line.
#[derive(Debug)]
pub struct MailtoTransport<W> {
    writer: W,
}

impl<W: Write> MailtoTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DeliveryTransport for MailtoTransport<W> {
    fn hand_off(&mut self, message: &DeliveryMessage) -> Result<(), TransportError> {
        writeln!(self.writer, "{}", message.mailto_uri())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// 以系統預設程式開啟 `mailto:`，不等待結束。 / Opens the `mailto:` URI with the platform handler without waiting.
///
/// The launcher process is reaped on a background thread, so long-lived hosts
/// do not accumulate exited children.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemMailTransport;

impl DeliveryTransport for SystemMailTransport {
    fn hand_off(&mut self, message: &DeliveryMessage) -> Result<(), TransportError> {
        let uri = message.mailto_uri();
        let mut child = opener_command(&uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => debug!(%status, "mail handler exited with failure"),
            Ok(_) => {}
            Err(err) => debug!(%err, "mail handler could not be reaped"),
        });
        Ok(())
    }
}

// url.dll receives the URI as a single argument; `cmd /C start` would split it at `&`.
#[cfg(target_os = "windows")]
fn opener_command(uri: &str) -> Command {
    let mut command = Command::new("rundll32");
    command.arg("url.dll,FileProtocolHandler").arg(uri);
    command
}

#[cfg(target_os = "macos")]
fn opener_command(uri: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(uri);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(uri: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(uri);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailto_transport_writes_uri_line() {
        let mut transport = MailtoTransport::new(Vec::new());
        let message = DeliveryMessage {
            recipient: "a@b.cv".into(),
            subject: "s".into(),
            body: "b".into(),
        };
        transport.hand_off(&message).unwrap();
        let written = String::from_utf8(transport.into_inner()).unwrap();
        assert_eq!(written, "mailto:a@b.cv?subject=s&body=b\n");
    }

    fn opener_args(uri: &str) -> Vec<String> {
        opener_command(uri)
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn opener_passes_uri_as_one_argument() {
        let message = DeliveryMessage {
            recipient: "suporte@civicdesk.cv".into(),
            subject: "[CivicDesk] Support Request: Login issue".into(),
            body: "ID do Pedido: TKT-1\nAnexos:\nNenhum".into(),
        };
        let uri = message.mailto_uri();
        let args = opener_args(&uri);
        assert_eq!(args.last(), Some(&uri));
        assert_eq!(args.iter().filter(|arg| arg.contains("body=")).count(), 1);
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn windows_opener_bypasses_cmd() {
        let command = opener_command("mailto:a@b.cv?subject=s&body=b");
        assert_eq!(command.get_program(), "rundll32");
        assert_eq!(
            opener_args("mailto:a@b.cv?subject=s&body=b"),
            ["url.dll,FileProtocolHandler", "mailto:a@b.cv?subject=s&body=b"]
        );
    }
}
