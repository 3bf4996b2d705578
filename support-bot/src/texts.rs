//! User-facing copy for the private-chat side of the relay.

pub const INSTRUCTION: &str = "Welcome to support. To get started, share the phone number \
your account is registered under using the button below.";

pub const PHONE_FOUND: &str = "Thanks, we found your account. You are all set.";

pub const HOW_TO_USE: &str = "Just type your question here and the support team will reply \
in this chat.";

pub const PHONE_NOT_FOUND: &str = "We could not find that phone number. Please check it and \
share your contact again.";

pub const PHONE_TAKEN: &str = "That phone number is already linked to another account. \
Contact support if you believe this is a mistake.";

pub const NOT_REGISTERED: &str = "Please register first: send /start and share your phone \
number.";

pub const HELP: &str = "Send /start to register with your phone number, then write your \
question here. An operator will answer in this chat.";

pub const NO_TICKET_FOR_REPLY: &str = "That message is not linked to a ticket, so the reply \
was not delivered.";

pub const TEMPORARILY_UNAVAILABLE: &str = "Something went wrong on our side. Please try \
again in a moment.";

pub const SHARE_PHONE_BUTTON: &str = "Share my phone number 📞";
