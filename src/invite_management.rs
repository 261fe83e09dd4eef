//! Invite codes gating account registration

use actix_web::{delete, get, post, web, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use rand::Rng;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::dto::invite_request::{GenerateInviteCodesRequest, PageQuery};
use crate::entity::invite_codes::InviteKind;
use crate::entity::{invite_code_usages, invite_codes};
use crate::error::AppError;
use crate::jwt::AdminUser;

pub const MAX_CODES_PER_BATCH: u32 = 100;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Validated parameters for one batch of codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBatch {
    pub count: u32,
    pub kind: InviteKind,
    pub max_uses: i32,
    pub expires_at: Option<DateTime<FixedOffset>>,
    pub remark: String,
}

impl CodeBatch {
    /// This function is PURE. Single-use codes always allow exactly one use.
    pub fn from_request(
        req: GenerateInviteCodesRequest,
        now: DateTime<FixedOffset>,
    ) -> Result<Self, AppError> {
        if !(1..=MAX_CODES_PER_BATCH).contains(&req.count) {
            return Err(AppError::InvalidRequest(format!(
                "count must be between 1 and {MAX_CODES_PER_BATCH}"
            )));
        }
        let max_uses = match req.kind {
            InviteKind::SingleUse => 1,
            InviteKind::MultiUse => req.max_uses.unwrap_or(1),
        };
        if max_uses < 1 {
            return Err(AppError::InvalidRequest(
                "max_uses must be at least 1".to_string(),
            ));
        }
        let expires_at = match req.expire_days {
            Some(days) if days < 0 => {
                return Err(AppError::InvalidRequest(
                    "expire_days must not be negative".to_string(),
                ))
            }
            Some(days) if days > 0 => Some(now + Duration::days(days)),
            _ => None,
        };

        Ok(CodeBatch {
            count: req.count,
            kind: req.kind,
            max_uses,
            expires_at,
            remark: req.remark,
        })
    }
}

/// 16 lowercase hex characters
pub fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 8] = rng.gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteCodePage {
    pub items: Vec<invite_codes::Model>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InviteCodeStats {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub expired: u64,
}

pub async fn generate_codes(
    db: &DatabaseConnection,
    created_by: Uuid,
    batch: CodeBatch,
) -> Result<Vec<invite_codes::Model>, AppError> {
    // Generated up front; the thread rng cannot be held across awaits
    let codes: Vec<String> = {
        let mut rng = rand::thread_rng();
        (0..batch.count).map(|_| random_code(&mut rng)).collect()
    };

    let created = db
        .transaction(|txn| {
            Box::pin(async move {
                let now = Utc::now();
                let mut created = Vec::with_capacity(codes.len());
                for code in codes {
                    let model = invite_codes::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        code: Set(code),
                        kind: Set(batch.kind),
                        max_uses: Set(batch.max_uses),
                        used_count: Set(0),
                        expires_at: Set(batch.expires_at),
                        created_by: Set(created_by),
                        remark: Set(batch.remark.clone()),
                        created_at: Set(now.into()),
                        updated_at: Set(now.into()),
                    }
                    .insert(txn)
                    .await?;
                    created.push(model);
                }
                Ok::<_, AppError>(created)
            })
        })
        .await?;

    info!(%created_by, count = created.len(), "invite codes generated");
    Ok(created)
}

pub async fn list_codes<C: ConnectionTrait>(
    conn: &C,
    page: u64,
    page_size: u64,
) -> Result<InviteCodePage, AppError> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

    let paginator = invite_codes::Entity::find()
        .order_by_desc(invite_codes::Column::CreatedAt)
        .paginate(conn, page_size);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok(InviteCodePage {
        items,
        total,
        page,
        page_size,
    })
}

/// Delete a code together with its usage history
pub async fn delete_code(db: &DatabaseConnection, code_id: Uuid) -> Result<(), AppError> {
    db.transaction(|txn| {
        Box::pin(async move {
            invite_codes::Entity::find_by_id(code_id)
                .one(txn)
                .await?
                .ok_or(AppError::InviteCodeNotFound)?;
            invite_code_usages::Entity::delete_many()
                .filter(invite_code_usages::Column::InviteCodeId.eq(code_id))
                .exec(txn)
                .await?;
            invite_codes::Entity::delete_by_id(code_id).exec(txn).await?;
            Ok::<_, AppError>(())
        })
    })
    .await?;
    info!(%code_id, "invite code deleted");
    Ok(())
}

pub async fn code_usages<C: ConnectionTrait>(
    conn: &C,
    code_id: Uuid,
) -> Result<Vec<invite_code_usages::Model>, AppError> {
    invite_codes::Entity::find_by_id(code_id)
        .one(conn)
        .await?
        .ok_or(AppError::InviteCodeNotFound)?;
    Ok(invite_code_usages::Entity::find()
        .filter(invite_code_usages::Column::InviteCodeId.eq(code_id))
        .order_by_desc(invite_code_usages::Column::UsedAt)
        .all(conn)
        .await?)
}

pub async fn code_stats<C: ConnectionTrait>(
    conn: &C,
    now: DateTime<FixedOffset>,
) -> Result<InviteCodeStats, AppError> {
    let not_expired = Condition::any()
        .add(invite_codes::Column::ExpiresAt.is_null())
        .add(invite_codes::Column::ExpiresAt.gt(now));

    Ok(InviteCodeStats {
        total: invite_codes::Entity::find().count(conn).await?,
        used: invite_codes::Entity::find()
            .filter(invite_codes::Column::UsedCount.gt(0))
            .count(conn)
            .await?,
        available: invite_codes::Entity::find()
            .filter(not_expired)
            .filter(
                Expr::col(invite_codes::Column::UsedCount)
                    .lt(Expr::col(invite_codes::Column::MaxUses)),
            )
            .count(conn)
            .await?,
        expired: invite_codes::Entity::find()
            .filter(invite_codes::Column::ExpiresAt.lte(now))
            .count(conn)
            .await?,
    })
}

/// Consume one use of `code` on behalf of a newly created user, on the
/// caller's transaction
pub(crate) async fn validate_and_use(
    txn: &DatabaseTransaction,
    code: &str,
    user_id: Uuid,
) -> Result<(), AppError> {
    let invite = invite_codes::Entity::find()
        .filter(invite_codes::Column::Code.eq(code))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::InviteCodeNotFound)?;

    let now = Utc::now();
    if invite.is_expired(now.into()) || invite.is_exhausted() {
        return Err(AppError::InviteCodeInvalid);
    }

    let used_count = invite.used_count + 1;
    let invite_id = invite.id;
    let mut invite: invite_codes::ActiveModel = invite.into();
    invite.used_count = Set(used_count);
    invite.updated_at = Set(now.into());
    invite.update(txn).await?;

    invite_code_usages::ActiveModel {
        id: Set(Uuid::new_v4()),
        invite_code_id: Set(invite_id),
        user_id: Set(user_id),
        used_at: Set(now.into()),
    }
    .insert(txn)
    .await?;
    Ok(())
}

#[post("/admin/invite-codes")]
pub async fn generate_invite_codes(
    admin: AdminUser,
    body: web::Json<GenerateInviteCodesRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let batch = CodeBatch::from_request(body.into_inner(), Utc::now().into())?;
    let codes = generate_codes(&db, admin.0.id, batch).await?;
    Ok(HttpResponse::Created().json(json!({ "codes": codes })))
}

#[get("/admin/invite-codes")]
pub async fn list_invite_codes(
    _admin: AdminUser,
    query: web::Query<PageQuery>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let page = list_codes(db.get_ref(), query.page, query.page_size).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/admin/invite-codes/stats")]
pub async fn invite_code_stats(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let stats = code_stats(db.get_ref(), Utc::now().into()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/admin/invite-codes/{code_id}/usages")]
pub async fn list_invite_code_usages(
    _admin: AdminUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let usages = code_usages(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(usages))
}

#[delete("/admin/invite-codes/{code_id}")]
pub async fn delete_invite_code(
    _admin: AdminUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    delete_code(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Invite code deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request(count: u32, kind: InviteKind) -> GenerateInviteCodesRequest {
        GenerateInviteCodesRequest {
            count,
            kind,
            max_uses: Some(5),
            expire_days: None,
            remark: String::new(),
        }
    }

    #[test]
    fn test_random_code_is_sixteen_hex_chars() {
        let mut rng = StdRng::seed_from_u64(7);
        let code = random_code(&mut rng);
        assert_eq!(code.len(), 16);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(code, random_code(&mut rng));
    }

    #[test]
    fn test_batch_count_bounds() {
        let now = Utc::now().into();
        assert!(CodeBatch::from_request(request(0, InviteKind::SingleUse), now).is_err());
        assert!(CodeBatch::from_request(request(101, InviteKind::SingleUse), now).is_err());
        assert!(CodeBatch::from_request(request(100, InviteKind::SingleUse), now).is_ok());
    }

    #[test]
    fn test_single_use_ignores_max_uses() {
        let batch = CodeBatch::from_request(request(1, InviteKind::SingleUse), Utc::now().into())
            .unwrap();
        assert_eq!(batch.max_uses, 1);

        let batch = CodeBatch::from_request(request(1, InviteKind::MultiUse), Utc::now().into())
            .unwrap();
        assert_eq!(batch.max_uses, 5);
    }

    #[test]
    fn test_expiry_from_days() {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut req = request(1, InviteKind::SingleUse);
        req.expire_days = Some(3);
        let batch = CodeBatch::from_request(req, now).unwrap();
        assert_eq!(batch.expires_at, Some(now + Duration::days(3)));

        let mut req = request(1, InviteKind::SingleUse);
        req.expire_days = Some(0);
        assert_eq!(CodeBatch::from_request(req, now).unwrap().expires_at, None);
    }
}
