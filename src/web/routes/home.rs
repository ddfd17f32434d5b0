pub async fn home() -> &'static str {
    "Email Collection Service is Running"
}
