use super::BackendResponse;
use super::MALFORMED_REPLY_TEXT;
use super::TRANSPORT_FAILURE_TEXT;

#[test]
fn it_returns_reply_text() {
    let res = BackendResponse::Reply("El VAN es positivo.".to_string());
    assert_eq!(res.text(), "El VAN es positivo.");
    assert!(!res.is_blank());
}

#[test]
fn it_maps_soft_failures_to_sentinels() {
    assert_eq!(BackendResponse::TransportFailure.text(), TRANSPORT_FAILURE_TEXT);
    assert_eq!(BackendResponse::Malformed.text(), MALFORMED_REPLY_TEXT);
}

#[test]
fn it_never_treats_soft_failures_as_blank() {
    assert!(!BackendResponse::TransportFailure.is_blank());
    assert!(!BackendResponse::Malformed.is_blank());
}

#[test]
fn it_detects_blank_replies() {
    assert!(BackendResponse::Reply("".to_string()).is_blank());
    assert!(BackendResponse::Reply("  \n\t".to_string()).is_blank());
}
