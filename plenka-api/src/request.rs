use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Client, ClientResult};

/// Making requests to the PastVu API.
impl Client {
    /// Make a request to the PastVu API. Every method shares one endpoint and
    /// takes its arguments as a JSON object in the `params` query parameter.
    ///
    /// `T` is the contents of the `result` key of the response envelope: for
    /// `photo.giveForPage`, `T` should be `{ photo: NetworkDetailedPhoto }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not valid.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &impl Serialize,
    ) -> ClientResult<T> {
        let bytes = self.request_raw(method, params).await?;
        Self::parse_response::<T>(&bytes)
    }

    pub(crate) async fn request_raw(
        &self,
        method: &str,
        params: &impl Serialize,
    ) -> ClientResult<Vec<u8>> {
        let params = serde_json::to_string(params)?;
        let request = self
            .client
            .get(format!("{}/api2", self.base_url))
            .query(&[("method", method), ("params", params.as_str())]);

        Ok(request
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .into())
    }

    pub(crate) fn parse_response<T: DeserializeOwned>(bytes: &[u8]) -> ClientResult<T> {
        let response: Response<T> = serde_json::from_slice(bytes)?;
        Ok(response.result)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Response<T> {
    result: T,
}
