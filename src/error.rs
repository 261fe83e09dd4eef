//! Application error type and its HTTP mapping.
//!
//! Every business failure is a distinct [`AppError`] variant. Variants are
//! grouped into an [`ErrorKind`] which decides the HTTP status, and carry a
//! stable machine-readable code for clients.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, TransactionError};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PhaseViolation,
    QuotaExceeded,
    ResourceUnavailable,
    BudgetExceeded,
    OwnershipViolation,
    NotParticipant,
    AlreadyProcessed,
    NotFound,
    Invalid,
    Unauthorized,
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::PhaseViolation | ErrorKind::NotParticipant => StatusCode::FORBIDDEN,
            ErrorKind::Invalid | ErrorKind::BudgetExceeded => StatusCode::BAD_REQUEST,
            ErrorKind::QuotaExceeded
            | ErrorKind::ResourceUnavailable
            | ErrorKind::OwnershipViolation
            | ErrorKind::AlreadyProcessed => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Phase violations
    #[error("operation requires the {required} phase, current phase is {current}")]
    WrongPhase {
        required: &'static str,
        current: String,
    },
    #[error("guarantee draws must be used before normal draws")]
    GuaranteeDrawsPending,
    #[error("policy bidding is not open")]
    BiddingNotOpen,
    #[error("policy bidding has not been closed")]
    BiddingNotClosed,
    #[error("club selection is not in progress")]
    SelectionNotInProgress,

    // Quota
    #[error("draw limit reached")]
    DrawLimitReached,
    #[error("registration is full")]
    RegistrationFull,
    #[error("already registered for this season")]
    AlreadyRegistered,
    #[error("user has already selected a club")]
    AlreadySelected,

    // Resource availability
    #[error("no available generals in the {0} pool")]
    NoAvailableAssets(&'static str),
    #[error("general is not available")]
    GeneralNotAvailable,
    #[error("club has already been selected")]
    ClubAlreadySelected,
    #[error("no clubs left to assign")]
    NoAvailableClubs,
    #[error("general has already been auctioned")]
    GeneralAlreadyAuctioned,
    #[error("no bids have been placed")]
    NoBids,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("invite code is expired or used up")]
    InviteCodeInvalid,

    // Budget
    #[error("insufficient space: need {needed}, have {available}")]
    InsufficientSpace { needed: i32, available: i32 },

    // Ownership
    #[error("offered assets are not owned by the proposer")]
    ItemNotOwned,
    #[error("requested assets are not owned by the receiver")]
    InvalidTradeItems,
    #[error("trade assets changed hands, trade cancelled")]
    TradeOwnershipChanged,

    // Standing
    #[error("user is not registered for this season")]
    NotRegistered,
    #[error("admin privileges required")]
    AdminRequired,
    #[error("not a participant of this trade")]
    NotTradeParticipant,
    #[error("it is not this user's turn to select")]
    NotYourTurn,

    #[error("trade has already been processed")]
    TradeAlreadyProcessed,

    // Not found
    #[error("user not found")]
    UserNotFound,
    #[error("general not found")]
    GeneralNotFound,
    #[error("treasure not found")]
    TreasureNotFound,
    #[error("club not found")]
    ClubNotFound,
    #[error("trade not found")]
    TradeNotFound,
    #[error("auction record not found")]
    AuctionRecordNotFound,
    #[error("invite code not found")]
    InviteCodeNotFound,
    #[error("user has no club selection")]
    SelectionNotFound,

    // Validation
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("cannot trade with yourself")]
    CannotTradeWithSelf,
    #[error("timeout must be between {min} and {max} minutes")]
    InvalidTimeout { min: i32, max: i32 },
    #[error("invite code is required")]
    InviteCodeRequired,

    // Auth boundary
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,

    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn wrong_phase(required: &'static str, current: impl std::fmt::Display) -> Self {
        AppError::WrongPhase {
            required,
            current: current.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        use AppError::*;
        match self {
            WrongPhase { .. }
            | GuaranteeDrawsPending
            | BiddingNotOpen
            | BiddingNotClosed
            | SelectionNotInProgress => ErrorKind::PhaseViolation,
            DrawLimitReached | RegistrationFull | AlreadyRegistered | AlreadySelected => {
                ErrorKind::QuotaExceeded
            }
            NoAvailableAssets(_)
            | GeneralNotAvailable
            | ClubAlreadySelected
            | NoAvailableClubs
            | GeneralAlreadyAuctioned
            | NoBids
            | UsernameTaken
            | InviteCodeInvalid => ErrorKind::ResourceUnavailable,
            InsufficientSpace { .. } => ErrorKind::BudgetExceeded,
            ItemNotOwned | InvalidTradeItems | TradeOwnershipChanged => {
                ErrorKind::OwnershipViolation
            }
            NotRegistered | AdminRequired | NotTradeParticipant | NotYourTurn => {
                ErrorKind::NotParticipant
            }
            TradeAlreadyProcessed => ErrorKind::AlreadyProcessed,
            UserNotFound | GeneralNotFound | TreasureNotFound | ClubNotFound | TradeNotFound
            | AuctionRecordNotFound | InviteCodeNotFound | SelectionNotFound => {
                ErrorKind::NotFound
            }
            InvalidRequest(_) | CannotTradeWithSelf | InvalidTimeout { .. } | InviteCodeRequired => {
                ErrorKind::Invalid
            }
            Unauthenticated | InvalidCredentials | InvalidToken => ErrorKind::Unauthorized,
            Database(_) | Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable code clients can branch on
    pub fn code(&self) -> &'static str {
        use AppError::*;
        match self {
            WrongPhase { .. } => "WRONG_PHASE",
            GuaranteeDrawsPending => "GUARANTEE_DRAWS_PENDING",
            BiddingNotOpen => "BIDDING_NOT_OPEN",
            BiddingNotClosed => "BIDDING_NOT_CLOSED",
            SelectionNotInProgress => "SELECTION_NOT_IN_PROGRESS",
            DrawLimitReached => "DRAW_LIMIT_REACHED",
            RegistrationFull => "REGISTRATION_FULL",
            AlreadyRegistered => "ALREADY_REGISTERED",
            AlreadySelected => "ALREADY_SELECTED",
            NoAvailableAssets(_) => "NO_AVAILABLE_ASSETS",
            GeneralNotAvailable => "GENERAL_NOT_AVAILABLE",
            ClubAlreadySelected => "CLUB_ALREADY_SELECTED",
            NoAvailableClubs => "NO_AVAILABLE_CLUBS",
            GeneralAlreadyAuctioned => "GENERAL_ALREADY_AUCTIONED",
            NoBids => "NO_BIDS",
            UsernameTaken => "USERNAME_TAKEN",
            InviteCodeInvalid => "INVITE_CODE_INVALID",
            InsufficientSpace { .. } => "INSUFFICIENT_SPACE",
            ItemNotOwned => "ITEM_NOT_OWNED",
            InvalidTradeItems => "INVALID_TRADE_ITEMS",
            TradeOwnershipChanged => "TRADE_OWNERSHIP_CHANGED",
            NotRegistered => "NOT_REGISTERED",
            AdminRequired => "ADMIN_REQUIRED",
            NotTradeParticipant => "NOT_TRADE_PARTICIPANT",
            NotYourTurn => "NOT_YOUR_TURN",
            TradeAlreadyProcessed => "TRADE_ALREADY_PROCESSED",
            UserNotFound => "USER_NOT_FOUND",
            GeneralNotFound => "GENERAL_NOT_FOUND",
            TreasureNotFound => "TREASURE_NOT_FOUND",
            ClubNotFound => "CLUB_NOT_FOUND",
            TradeNotFound => "TRADE_NOT_FOUND",
            AuctionRecordNotFound => "AUCTION_RECORD_NOT_FOUND",
            InviteCodeNotFound => "INVITE_CODE_NOT_FOUND",
            SelectionNotFound => "SELECTION_NOT_FOUND",
            InvalidRequest(_) => "INVALID_REQUEST",
            CannotTradeWithSelf => "CANNOT_TRADE_WITH_SELF",
            InvalidTimeout { .. } => "INVALID_TIMEOUT",
            InviteCodeRequired => "INVITE_CODE_REQUIRED",
            Unauthenticated => "UNAUTHENTICATED",
            InvalidCredentials => "INVALID_CREDENTIALS",
            InvalidToken => "INVALID_TOKEN",
            Database(_) | Internal(_) => "INTERNAL",
        }
    }
}

impl From<TransactionError<AppError>> for AppError {
    fn from(err: TransactionError<AppError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => AppError::Database(db_err),
            TransactionError::Transaction(app_err) => app_err,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let kind = self.kind();
        let message = if kind == ErrorKind::Internal {
            tracing::error!(error = %self, "request failed with internal error");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(kind.status_code())
            .content_type("application/json")
            .json(json!({
                "error": message,
                "kind": kind,
                "code": self.code(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(AppError::TradeNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::wrong_phase("draw", "signup").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::NotYourTurn.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InsufficientSpace { needed: 10, available: 5 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::DrawLimitReached.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::TradeAlreadyProcessed.status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_database_errors_are_internal() {
        let err: AppError = DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.code(), "INTERNAL");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_transaction_error_unwraps_business_error() {
        let err: AppError = TransactionError::Transaction(AppError::ClubAlreadySelected).into();
        assert!(matches!(err, AppError::ClubAlreadySelected));
        assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
    }

    #[test]
    fn test_wrong_phase_message() {
        let err = AppError::wrong_phase("draft", "trading");
        assert_eq!(
            err.to_string(),
            "operation requires the draft phase, current phase is trading"
        );
        assert_eq!(err.code(), "WRONG_PHASE");
    }
}
