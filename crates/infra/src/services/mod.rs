mod email;

pub use email::{
    EmailNotifier, IMailTransport, INotifier, InMemoryMailTransport, MailMessage, SmtpMailTransport,
    TransportError,
};
