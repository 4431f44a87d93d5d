mod reports;

pub use reports::{
    DeliveryOutcome, ImageOrigin, RefillReport, RegistrationStatus, RetractionOutcome,
    SkipReason, TargetDelivery, TickReport,
};
