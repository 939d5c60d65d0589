//! Access decisions. Callers fetch claims and ownership facts first; nothing
//! in here touches the store.

use uuid::Uuid;

use crate::auth::claims::{Claims, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden(&'static str),
    /// Also used when the resource exists but belongs to someone else.
    NotFound(&'static str),
    InvalidAdminCode,
}

/// Which roles may attempt an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    AnyUser,
    JobSeekers,
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewOwnData,
    ApplyForJob,
    CreateJob,
    ListOwnJobs,
    ViewJobForEdit,
    UpdateJob,
    DeleteJob,
    ViewApplicants,
    ReviewApplication,
    ViewAdminStats,
}

impl Action {
    pub fn audience(self) -> Audience {
        match self {
            Action::ViewOwnData => Audience::AnyUser,
            Action::ApplyForJob => Audience::JobSeekers,
            _ => Audience::Staff,
        }
    }

    /// Actions that touch one specific posting and require its ownership.
    pub fn is_resource_scoped(self) -> bool {
        matches!(
            self,
            Action::ViewJobForEdit
                | Action::UpdateJob
                | Action::DeleteJob
                | Action::ReviewApplication
        )
    }

    fn forbidden_message(self) -> &'static str {
        match self {
            Action::ApplyForJob => "Only job seekers can apply for jobs",
            Action::CreateJob => "Only admins can create jobs",
            Action::UpdateJob => "Only admins can update jobs",
            Action::DeleteJob => "Only admins can delete jobs",
            Action::ViewApplicants => "Only admins can view applicants",
            Action::ReviewApplication => "Only admins can update application status",
            Action::ViewAdminStats => "Admin access required",
            _ => "Only admins can access this endpoint",
        }
    }

    fn resource_name(self) -> &'static str {
        match self {
            Action::ReviewApplication => "Application",
            _ => "Job",
        }
    }
}

/// Ownership facts for a resource-scoped action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub caller_id: Uuid,
    /// `None` when the resource does not exist.
    pub owner_id: Option<Uuid>,
}

/// Role gate. Returns the claims back so handlers can keep using them.
pub fn authorize(claims: Option<&Claims>, action: Action) -> Result<&Claims, Denial> {
    let claims = claims.ok_or(Denial::Unauthenticated)?;
    let allowed = match action.audience() {
        Audience::AnyUser => true,
        Audience::JobSeekers => claims.role == Role::JobSeeker,
        Audience::Staff => claims.role.is_staff(),
    };
    if !allowed {
        return Err(Denial::Forbidden(action.forbidden_message()));
    }
    Ok(claims)
}

/// Role gate followed by the ownership check. A posting owned by another
/// admin is indistinguishable from a missing one.
pub fn authorize_owned(
    claims: Option<&Claims>,
    action: Action,
    ownership: Ownership,
) -> Result<(), Denial> {
    authorize(claims, action)?;
    if action.is_resource_scoped() && ownership.owner_id != Some(ownership.caller_id) {
        return Err(Denial::NotFound(action.resource_name()));
    }
    Ok(())
}

/// Picks the role for a new account.
pub fn registration_role(
    wants_admin: bool,
    supplied_code: Option<&str>,
    configured_code: &str,
) -> Result<Role, Denial> {
    if !wants_admin {
        return Ok(Role::JobSeeker);
    }
    match supplied_code {
        Some(code) if code == configured_code => Ok(Role::Admin),
        _ => Err(Denial::InvalidAdminCode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::TokenKind;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: "someone@example.com".into(),
            role,
            iat: 0,
            exp: i64::MAX,
            kind: TokenKind::Access,
        }
    }

    #[test]
    fn missing_claims_are_unauthenticated() {
        assert_eq!(
            authorize(None, Action::ViewOwnData).unwrap_err(),
            Denial::Unauthenticated
        );
    }

    #[test]
    fn job_seeker_cannot_run_admin_actions() {
        let c = claims(Role::JobSeeker);
        for action in [
            Action::CreateJob,
            Action::UpdateJob,
            Action::DeleteJob,
            Action::ViewApplicants,
            Action::ViewAdminStats,
        ] {
            assert!(matches!(
                authorize(Some(&c), action),
                Err(Denial::Forbidden(_))
            ));
        }
    }

    #[test]
    fn moderators_count_as_staff() {
        let c = claims(Role::Moderator);
        assert!(authorize(Some(&c), Action::CreateJob).is_ok());
    }

    #[test]
    fn only_job_seekers_apply() {
        assert!(authorize(Some(&claims(Role::JobSeeker)), Action::ApplyForJob).is_ok());
        assert!(matches!(
            authorize(Some(&claims(Role::Admin)), Action::ApplyForJob),
            Err(Denial::Forbidden(_))
        ));
        assert!(matches!(
            authorize(Some(&claims(Role::Employer)), Action::ApplyForJob),
            Err(Denial::Forbidden(_))
        ));
    }

    #[test]
    fn foreign_posting_looks_missing() {
        let c = claims(Role::Admin);
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let res = authorize_owned(
            Some(&c),
            Action::UpdateJob,
            Ownership { caller_id: me, owner_id: Some(other) },
        );
        assert_eq!(res, Err(Denial::NotFound("Job")));

        let missing = authorize_owned(
            Some(&c),
            Action::DeleteJob,
            Ownership { caller_id: me, owner_id: None },
        );
        assert_eq!(missing, Err(Denial::NotFound("Job")));
    }

    #[test]
    fn own_posting_is_allowed() {
        let c = claims(Role::Admin);
        let me = Uuid::new_v4();
        assert!(authorize_owned(
            Some(&c),
            Action::UpdateJob,
            Ownership { caller_id: me, owner_id: Some(me) },
        )
        .is_ok());
    }

    #[test]
    fn role_check_precedes_ownership() {
        let c = claims(Role::JobSeeker);
        let me = Uuid::new_v4();
        let res = authorize_owned(
            Some(&c),
            Action::UpdateJob,
            Ownership { caller_id: me, owner_id: Some(me) },
        );
        assert!(matches!(res, Err(Denial::Forbidden(_))));
    }

    #[test]
    fn admin_registration_needs_matching_code() {
        assert_eq!(registration_role(false, None, "X"), Ok(Role::JobSeeker));
        assert_eq!(registration_role(true, Some("X"), "X"), Ok(Role::Admin));
        assert_eq!(
            registration_role(true, Some("Y"), "X"),
            Err(Denial::InvalidAdminCode)
        );
        assert_eq!(registration_role(true, None, "X"), Err(Denial::InvalidAdminCode));
    }
}
