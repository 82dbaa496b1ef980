use shared::{UserProfile, UserRole};

use crate::domain::models::user::{DomainUser, Role};

pub struct UserMapper;

impl UserMapper {
    pub fn role_to_dto(role: Role) -> UserRole {
        match role {
            Role::Admin => UserRole::Admin,
            Role::Employee => UserRole::Employee,
        }
    }

    /// Public profile; the password hash never leaves the domain
    pub fn to_dto(user: DomainUser) -> UserProfile {
        UserProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            role: Self::role_to_dto(user.role),
            department: user.department,
            vacation_days_allotted: user.vacation_days_allotted,
            hire_date: user.hire_date,
        }
    }

    pub fn to_dto_list(users: Vec<DomainUser>) -> Vec<UserProfile> {
        users.into_iter().map(Self::to_dto).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_profile_drops_password_hash() {
        let profile = UserMapper::to_dto(DomainUser {
            id: "u1".to_string(),
            email: "ana@demo.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: "Ana".to_string(),
            role: Role::Admin,
            department: "Ventas".to_string(),
            vacation_days_allotted: 22,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        });

        assert_eq!(profile.role, UserRole::Admin);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("argon2"));
    }
}
