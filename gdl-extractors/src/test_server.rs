//! Local stand-in for the gallery website, used by the extractor tests.
use std::{collections::HashMap, net::SocketAddr};

use gdl_common::gallery::GalleryReference;
use warp::{http::StatusCode, Filter};

use crate::extractor_config::ServerConfig;

pub const GALLERY_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div id="content">
  <div class="gallery-info to-gall-info">
    <div class="tags"><div><a href="/channels/"><span>Channels</span></a> <a href="/channels/studio-a/"><span>Studio A</span></a></div></div>
    <div class="tags"><div><a href="/pornstars/jane-roe/"><span>Jane Roe</span></a></div></div>
    <div class="tags"><div><a href="/categories/outdoor/"><span>Outdoor</span></a> <a href="/categories/beach/"><span>Beach</span></a></div></div>
    <div class="tags"><div><a href="/tags/sunset/"><span>Sunset</span></a> <a href="/tags/sand/"><span>Sand</span></a></div></div>
  </div>
</div>
<ul id="tiles">
  <li class="thumbwook"><a href="/a"><img data-src="https://cdni.pornpics.com/460/1/2/a_01.jpg" alt=" Jane at the beach "></a></li>
  <li class="thumbwook"><a href="/b"><img src="/lazy.gif" alt="still loading"></a></li>
  <li class="thumbwook"><a href="/c"><img data-src="//cdni.pornpics.com/460/1/2/b_02.jpg"></a></li>
</ul>
</body>
</html>"#;

pub struct Stub {
    pub addr: SocketAddr,
}

fn number(query: &HashMap<String, String>, key: &str) -> u64 {
    query.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
}

pub async fn spawn_stub() -> Stub {
    let popular = warp::path("popular")
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            let limit = number(&query, "limit");
            let offset = number(&query, "offset");
            let refs: Vec<GalleryReference> = (offset..offset + limit)
                .map(|i| GalleryReference {
                    gallery_url: format!("http://gallery.test/galleries/popular-{i}/"),
                    description: format!("popular {i}"),
                })
                .collect();
            warp::reply::json(&refs)
        });

    let search = warp::path("search")
        .and(warp::path("srch.php"))
        .and(warp::query::<HashMap<String, String>>())
        .map(|query: HashMap<String, String>| {
            let q = query.get("q").cloned().unwrap_or_default();
            let lang = query.get("lang").cloned().unwrap_or_default();
            let offset = number(&query, "offset");
            let refs = vec![GalleryReference {
                gallery_url: format!("http://gallery.test/galleries/{lang}-{offset}/"),
                description: format!("{q} {offset}"),
            }];
            warp::reply::json(&refs)
        });

    let broken = warp::path("broken")
        .map(|| warp::reply::with_status("boom", StatusCode::INTERNAL_SERVER_ERROR));

    let garbage = warp::path("garbage").map(|| "definitely not json");

    let gallery = warp::path("galleries")
        .and(warp::path::param::<String>())
        .map(|_name: String| warp::reply::html(GALLERY_HTML));

    let routes = popular.or(search).or(broken).or(garbage).or(gallery);

    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    Stub { addr }
}

pub fn test_config(addr: SocketAddr) -> ServerConfig {
    ServerConfig {
        name: String::from("stub"),
        pretty_name: String::from("Stub"),
        base_url: format!("http://{addr}"),
        popular_url: format!("http://{addr}/popular/"),
        search_url: format!("http://{addr}/search/srch.php"),
        ..ServerConfig::default()
    }
}
