use garc::conf::{ACCOUNT_ENV, Credentials, PASSWORD_ENV, Profile};
use garc::gab::service::{GabService, Service, Tolerance};

// These tests talk to the live Gab API and need a real account in
// $GAB_USER_ACCOUNT and $GAB_USER_PASSWORD, so they only run when asked
// for with `--ignored`. There's no telling what Gab will send back, so
// they only check that a non-empty response arrives.

async fn service() -> GabService {
    let credentials = Credentials::resolve(None, None, &Profile::default())
        .unwrap_or_else(|_| panic!("set {ACCOUNT_ENV} and {PASSWORD_ENV} to run this test"));
    GabService::login(&credentials, None, Tolerance::new(1, 1))
        .await
        .unwrap()
}

#[tokio::test]
#[ignore]
async fn it_retrieves_profiles() {
    let resp = service()
        .await
        .get("/api/v1/account_by_username/a", &[])
        .await
        .unwrap();
    assert_ne!(resp, "");
}

#[tokio::test]
#[ignore]
async fn it_retrieves_popular_posts() {
    let resp = service()
        .await
        .get("/api/v1/timelines/explore", &[])
        .await
        .unwrap();
    assert_ne!(resp, "");
}
