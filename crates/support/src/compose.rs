use std::fmt::Write as _;

use crate::SupportTicket;

pub const DEFAULT_PRODUCT_NAME: &str = "CivicDesk";
pub const DEFAULT_RECIPIENT: &str = "suporte@civicdesk.cv";

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S UTC";
const NO_ATTACHMENTS: &str = "Nenhum";

/// 交給外部郵件通道的訊息。 / Message handed to the external mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl DeliveryMessage {
    /// `mailto:` URI with every component percent-encoded. Body line breaks
    /// are sent as CRLF.
    pub fn mailto_uri(&self) -> String {
        let recipient = urlencoding::encode(&self.recipient).replace("%40", "@");
        let body = self.body.replace("\r\n", "\n").replace('\n', "\r\n");
        format!(
            "mailto:{}?subject={}&body={}",
            recipient,
            urlencoding::encode(&self.subject),
            urlencoding::encode(&body)
        )
    }
}

/// Builds the support notification for a saved ticket.
///
/// Only attachment metadata is stored, so the message can list attachments
/// but never carry their contents.
#[derive(Debug, Clone)]
pub struct DeliveryComposer {
    product: String,
    recipient: String,
}

impl Default for DeliveryComposer {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_NAME, DEFAULT_RECIPIENT)
    }
}

impl DeliveryComposer {
    pub fn new(product: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            recipient: recipient.into(),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn compose(&self, ticket: &SupportTicket) -> DeliveryMessage {
        let mut body = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(body, "ID do Pedido: {}", ticket.id);
        let _ = writeln!(body, "Data: {}", ticket.created_at.format(TIMESTAMP_FORMAT));
        let _ = writeln!(body, "Email: {}", ticket.contact_email);
        let _ = writeln!(body, "Assunto: {}", ticket.subject);
        let _ = writeln!(body);
        let _ = writeln!(body, "Mensagem:");
        let _ = writeln!(body, "{}", ticket.message);
        let _ = writeln!(body);
        let _ = writeln!(body, "Anexos:");
        if ticket.attachments.is_empty() {
            let _ = writeln!(body, "{NO_ATTACHMENTS}");
        } else {
            for (index, attachment) in ticket.attachments.iter().enumerate() {
                let _ = writeln!(
                    body,
                    "{}. {} ({:.2} KB)",
                    index + 1,
                    attachment.name,
                    attachment.size_kb()
                );
            }
        }

        DeliveryMessage {
            recipient: self.recipient.clone(),
            subject: format!("[{}] Support Request: {}", self.product, ticket.subject),
            body,
        }
    }
}
