pub mod mailer;
pub mod templates;

pub use mailer::Mailer;
pub use templates::NotificationTemplates;

use futures::future::join_all;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::error;

use crate::entities::{user, User};
use crate::scoring::ledger::json_strings;
use crate::scoring::Achievement;

/// Tells each of the user's friends about each newly earned achievement —
/// one email per (friend, achievement) pair, every send an independent
/// future. Failures are logged and dropped; the award that triggered the
/// fan-out is already committed and is never rolled back here. Returns the
/// number of successful sends.
pub async fn notify_achievement_friends<C: ConnectionTrait>(
    conn: &C,
    mailer: &Mailer,
    user: &user::Model,
    achievements: &[Achievement],
) -> usize {
    if achievements.is_empty() {
        return 0;
    }
    let friend_ids = json_strings(&user.friends);
    if friend_ids.is_empty() {
        return 0;
    }

    let friends = match User::find()
        .filter(user::Column::Id.is_in(friend_ids))
        .all(conn)
        .await
    {
        Ok(friends) => friends,
        Err(e) => {
            error!("Failed to load friends for achievement fan-out: {}", e);
            return 0;
        }
    };

    let user_name = if user.name.is_empty() {
        user.id.as_str()
    } else {
        user.name.as_str()
    };

    let mut sends = Vec::new();
    for friend in friends
        .iter()
        .filter(|f| f.notifications_enabled && !f.email.is_empty())
    {
        for achievement in achievements {
            let subject = NotificationTemplates::achievement_subject(user_name, achievement);
            let body =
                NotificationTemplates::achievement_email(&friend.name, user_name, achievement);
            let mailer = mailer.clone();
            let to_email = friend.email.clone();
            let to_name = friend.name.clone();
            sends.push(async move {
                mailer
                    .send_email(&to_email, &to_name, &subject, &body)
                    .await
                    .is_ok()
            });
        }
    }

    join_all(sends).await.into_iter().filter(|ok| *ok).count()
}

/// Handler-facing wrapper: loads the user and fans out. A user that cannot
/// be loaded just means nobody gets told; the award itself already stands.
pub async fn fan_out<C: ConnectionTrait>(
    conn: &C,
    mailer: &Mailer,
    user_id: &str,
    achievements: &[Achievement],
) -> usize {
    if achievements.is_empty() {
        return 0;
    }
    match User::find_by_id(user_id).one(conn).await {
        Ok(Some(user)) => notify_achievement_friends(conn, mailer, &user, achievements).await,
        Ok(None) => 0,
        Err(e) => {
            error!("Failed to load user {} for fan-out: {}", user_id, e);
            0
        }
    }
}
