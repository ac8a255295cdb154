pub mod github_webhook_request;
pub mod github_webhook_route;
