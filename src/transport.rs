//! Outbound mail: SMTP via lettre.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::TransportError;

/// Sends finished replies. The envelope comes from the message headers.
pub trait ReplyTransport {
    fn send_reply(&mut self, message: &Message) -> Result<(), TransportError>;

    /// Close the connection. Further sends fail.
    fn quit(&mut self) -> Result<(), TransportError>;
}

/// Authenticated SMTP relay using STARTTLS (usually port 587).
///
/// The connection is pooled, so one session serves the whole run.
pub struct SmtpRelay {
    transport: Option<SmtpTransport>,
    host: String,
}

impl SmtpRelay {
    /// Build the transport and verify that connecting and authenticating
    /// works before any message is processed.
    pub fn connect(
        host: &str,
        port: u16,
        username: &str,
        password: &SecretString,
    ) -> Result<Self, TransportError> {
        let connect_err = |reason: String| TransportError::ConnectFailed {
            host: format!("{host}:{port}"),
            reason,
        };

        debug!("Connecting to SMTP server {host}:{port}");
        let creds = Credentials::new(username.to_string(), password.expose_secret().to_string());
        let transport = SmtpTransport::starttls_relay(host)
            .map_err(|e| connect_err(format!("SMTP relay error: {e}")))?
            .port(port)
            .credentials(creds)
            .build();

        match transport.test_connection() {
            Ok(true) => {
                debug!("Successfully connected to SMTP server");
                Ok(Self {
                    transport: Some(transport),
                    host: host.to_string(),
                })
            }
            Ok(false) => Err(connect_err("server did not accept the connection".into())),
            Err(e) => Err(connect_err(e.to_string())),
        }
    }
}

impl ReplyTransport for SmtpRelay {
    fn send_reply(&mut self, message: &Message) -> Result<(), TransportError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| TransportError::SendFailed(format!("connection to {} closed", self.host)))?;
        transport
            .send(message)
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        Ok(())
    }

    fn quit(&mut self) -> Result<(), TransportError> {
        // Dropping the pool sends QUIT on idle connections.
        self.transport.take();
        Ok(())
    }
}
