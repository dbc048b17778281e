use club_manager::models::{
    ActionType, ContactAdminRequest, CreateClubRequest, Role, SendInviteRequest,
};
use serde_json::json;

#[test]
fn roles_use_the_stored_camel_case_text() {
    assert_eq!(serde_json::to_value(Role::SuperAdmin).unwrap(), json!("superAdmin"));
    assert_eq!(serde_json::to_value(Role::SuperUser).unwrap(), json!("superUser"));
    assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    assert_eq!(Role::User.to_string(), "user");
}

#[test]
fn unknown_role_text_does_not_parse() {
    let err = "coach".parse::<Role>().unwrap_err();
    assert_eq!(err.to_string(), "unknown role `coach`");
}

#[test]
fn action_types_are_upper_case() {
    assert_eq!(serde_json::to_value(ActionType::Convocation).unwrap(), json!("CONVOCATION"));
    assert_eq!(ActionType::Equipe.as_str(), "EQUIPE");
}

#[test]
fn invite_accepts_camel_case_club_name() {
    let request: SendInviteRequest = serde_json::from_value(json!({
        "email": "a@b.test",
        "link": "https://app.test",
        "role": "user",
        "clubName": "FC Test"
    }))
    .unwrap();
    assert_eq!(request.club_name.as_deref(), Some("FC Test"));

    let without: SendInviteRequest =
        serde_json::from_value(json!({"email": "a@b.test", "link": "x", "role": "user"})).unwrap();
    assert!(without.club_name.is_none());
}

#[test]
fn contact_request_accepts_both_casings() {
    let camel: ContactAdminRequest = serde_json::from_value(json!({
        "adminEmail": "admin@club.test",
        "clubName": "FC Test"
    }))
    .unwrap();
    let snake: ContactAdminRequest = serde_json::from_value(json!({
        "admin_email": "admin@club.test",
        "club_name": "FC Test"
    }))
    .unwrap();

    assert_eq!(camel.admin_email, snake.admin_email);
    assert_eq!(camel.club_name, "FC Test");
}

#[test]
fn contact_request_has_no_requester_field() {
    // Older clients still send it; it is ignored rather than trusted.
    let request: ContactAdminRequest = serde_json::from_value(json!({
        "adminEmail": "admin@club.test",
        "requesterEmail": "ceo@bank.test",
        "clubName": "FC Test"
    }))
    .unwrap();

    let encoded = serde_json::to_value(&request).unwrap();
    assert!(encoded.get("requester_email").is_none());
}

#[test]
fn create_club_request_accepts_ville() {
    let request: CreateClubRequest =
        serde_json::from_value(json!({"name": "FC Test", "ville": "Lyon"})).unwrap();
    assert_eq!(request.city.as_deref(), Some("Lyon"));

    let bare: CreateClubRequest = serde_json::from_value(json!({"name": "FC Test"})).unwrap();
    assert!(bare.city.is_none());
}
