use crate::bot::Bot;
use ed25519_dalek::{Signature, Verifier};
use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Body, Bytes},
    header::{HeaderValue, CONTENT_TYPE},
    Method, Request, Response, StatusCode,
};

pub use ed25519_dalek::VerifyingKey as PublicKey;

/// Parses the hex-encoded application public key.
pub fn parse_public_key(text: &str) -> Option<PublicKey> {
    let mut bytes = [0; 32];
    hex::decode_to_slice(text, &mut bytes).ok()?;
    PublicKey::from_bytes(&bytes).ok()
}

pub async fn try_respond<B>(req: Request<B>, public: &PublicKey, bot: &Bot) -> Result<Response<Full<Bytes>>, StatusCode>
where
    B: Body<Data = Bytes>,
{
    // Disallow non-POST methods and unexpected paths
    if req.method() != Method::POST || req.uri().path() != "/" {
        return Err(StatusCode::NOT_FOUND);
    }

    // Retrieve security headers
    let (parts, body) = req.into_parts();
    let maybe_sig = parts.headers.get("X-Signature-Ed25519");
    let maybe_time = parts.headers.get("X-Signature-Timestamp");
    let (sig, timestamp) = maybe_sig.zip(maybe_time).ok_or(StatusCode::UNAUTHORIZED)?;
    let mut signature = [0; 64];
    hex::decode_to_slice(sig.as_bytes(), &mut signature).map_err(|_| StatusCode::BAD_REQUEST)?;
    let signature = Signature::from_bytes(&signature);

    // Append body after the timestamp
    let payload = body.collect().await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?.to_bytes();
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(&payload);

    // Validate the challenge
    public.verify(&message, &signature).map_err(|_| StatusCode::UNAUTHORIZED)?;
    drop(message);

    // Parse incoming interaction
    let interaction = serde_json::from_slice(&payload).map_err(|_| StatusCode::BAD_REQUEST)?;
    drop(payload);

    // Construct new body
    let reply = bot.on_message(interaction).await;
    let bytes = serde_json::to_vec(&reply).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(res)
}
