use crate::scoring::Achievement;

pub struct NotificationTemplates;

impl NotificationTemplates {
    pub fn achievement_subject(user_name: &str, achievement: &Achievement) -> String {
        format!(
            "{} {} just earned \"{}\"!",
            achievement.icon, user_name, achievement.name
        )
    }

    /// HTML email telling a friend about a freshly earned achievement
    pub fn achievement_email(
        friend_name: &str,
        user_name: &str,
        achievement: &Achievement,
    ) -> String {
        let greeting = if friend_name.is_empty() {
            "Hi there".to_string()
        } else {
            format!("Hi {}", friend_name)
        };

        format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #ddd; border-radius: 8px; }}
        .header {{ background-color: #e8f5e9; padding: 15px; border-radius: 8px 8px 0 0; text-align: center; }}
        .header h1 {{ margin: 0; color: #2e7d32; }}
        .badge {{ font-size: 48px; margin: 10px 0; }}
        .content {{ padding: 20px; }}
        .bonus {{ background-color: #2e7d32; color: white; padding: 5px 10px; border-radius: 4px; font-weight: bold; display: inline-block; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #b2bec3; text-align: center; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>🌍 EcoTrack Achievement</h1>
            <div class="badge">{icon}</div>
        </div>
        <div class="content">
            <p>{greeting},</p>
            <p><strong>{user_name}</strong> just earned <strong>{name}</strong>!</p>
            <p>{description}</p>
            <p><span class="bonus">+{points_bonus} points</span></p>
            <p>Think you can keep up? Log today's eco-actions and find out.</p>
        </div>
        <div class="footer">
            <p>Sent by EcoTrack because you are friends with {user_name}</p>
        </div>
    </div>
</body>
</html>
"#,
            icon = achievement.icon,
            greeting = greeting,
            user_name = user_name,
            name = achievement.name,
            description = achievement.description,
            points_bonus = achievement.points_bonus,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::NotificationTemplates;
    use crate::scoring::DEFAULT_CATALOG;

    #[test]
    fn email_mentions_the_achievement_and_the_bonus() {
        let achievement = &DEFAULT_CATALOG[0];
        let body = NotificationTemplates::achievement_email("Robin", "Alex", achievement);
        assert!(body.contains("Alex"));
        assert!(body.contains(achievement.name));
        assert!(body.contains(&format!("+{} points", achievement.points_bonus)));
    }

    #[test]
    fn subject_leads_with_the_icon() {
        let achievement = &DEFAULT_CATALOG[0];
        let subject = NotificationTemplates::achievement_subject("Alex", achievement);
        assert!(subject.starts_with(achievement.icon));
        assert!(subject.contains(achievement.name));
    }
}
