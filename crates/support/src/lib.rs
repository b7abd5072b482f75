pub mod attachment;
pub mod compose;
pub mod form;
pub mod store;
pub mod ticket;
pub mod transport;

pub use attachment::{
    AttachmentList, AttachmentMeta, AttachmentRejection, AttachmentValidator, RejectReason,
    ValidationReport, MAX_ATTACHMENTS, MAX_ATTACHMENT_BYTES,
};
pub use compose::{DeliveryComposer, DeliveryMessage, DEFAULT_PRODUCT_NAME, DEFAULT_RECIPIENT};
pub use form::{FormError, FormStatus, SubmitOutcome, SupportForm, DEFAULT_CLOSE_DELAY};
pub use store::{FileStorage, KeyValueStorage, MemoryStorage, TicketStore, TicketStoreError, TICKETS_KEY};
pub use ticket::{SupportTicket, TicketFields};
pub use transport::{DeliveryTransport, MailtoTransport, SystemMailTransport, TransportError};
