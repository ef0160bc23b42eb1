#[macro_export]
macro_rules! server_config {
    ($name:expr, $pretty_name:expr, $client:expr, $ext:expr, $base_url:expr, $popular_url:expr, $search_url:expr, $search_language:expr, $thumbnail_segment:expr, $full_size_segment:expr, $max_page_limit:expr) => {
        $crate::extractor_config::ServerConfig {
            name: String::from($name),
            pretty_name: String::from($pretty_name),
            client_user_agent: String::from($client),
            extractor_user_agent: String::from($ext),
            base_url: String::from($base_url),
            popular_url: String::from($popular_url),
            search_url: String::from($search_url),
            search_language: String::from($search_language),
            thumbnail_segment: String::from($thumbnail_segment),
            full_size_segment: String::from($full_size_segment),
            max_page_limit: $max_page_limit,
        }
    };
}
