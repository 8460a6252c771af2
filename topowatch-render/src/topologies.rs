//! The concrete topology views, wired from selectors, maps and filters.

use std::sync::Arc;

use crate::map::Map;
use crate::mapping::*;
use crate::memoise::{Memoise, RenderCache};
use crate::renderer::{Reduce, SharedRenderer};
use crate::selector::*;

fn map(
    f: fn(&crate::RenderableNode, &crate::MapContext<'_>) -> Vec<crate::RenderableNode>,
    inner: SharedRenderer,
) -> SharedRenderer {
    Arc::new(Map::from_fn(f, inner))
}

fn select(selector: TopologySelector) -> SharedRenderer {
    Arc::new(selector)
}

fn reduce(renderers: Vec<SharedRenderer>) -> SharedRenderer {
    Arc::new(Reduce::new(renderers))
}

/// Every view, built once and sharing one render cache.
///
/// The expensive intermediate graphs (endpoints, processes, containers) are
/// memoised so that views built on top of them reuse the work.
#[derive(Clone)]
pub struct Topologies {
    pub endpoints: SharedRenderer,
    pub processes: SharedRenderer,
    pub process_names: SharedRenderer,
    pub containers: SharedRenderer,
    pub containers_with_image_name: SharedRenderer,
    pub container_images: SharedRenderer,
    pub addresses: SharedRenderer,
    pub hosts: SharedRenderer,
    pub pods: SharedRenderer,
    pub pod_services: SharedRenderer,
    cache: Arc<RenderCache>,
}

impl Topologies {
    pub fn new(cache: Arc<RenderCache>) -> Self {
        let memoise = |inner: SharedRenderer| -> SharedRenderer {
            Arc::new(Memoise::new(inner, Arc::clone(&cache)))
        };

        let endpoints = memoise(map(map_endpoint_identity, select(SELECT_ENDPOINT)));

        let processes = memoise(reduce(vec![
            map(map_endpoint_to_process, endpoints.clone()),
            map(map_process_identity, select(SELECT_PROCESS)),
        ]));

        let process_names = map(map_count_processes, map(map_process_to_name, processes.clone()));

        let containers = memoise(reduce(vec![
            map(map_process_to_container, processes.clone()),
            map(map_container_identity, select(SELECT_CONTAINER)),
        ]));

        let containers_with_image_name = map(map_container_image_name, containers.clone());

        let container_images = map(
            map_count_containers,
            reduce(vec![
                map(map_container_to_image, containers.clone()),
                map(map_container_image_identity, select(SELECT_CONTAINER_IMAGE)),
            ]),
        );

        let addresses = map(map_address_identity, select(SELECT_ADDRESS));

        let hosts = reduce(vec![
            map(map_host_identity, select(SELECT_HOST)),
            map(map_x_to_host, processes.clone()),
            map(map_address_to_host, addresses.clone()),
        ]);

        let pods = reduce(vec![
            map(map_container_to_pod, containers.clone()),
            map(map_pod_identity, select(SELECT_POD)),
        ]);

        let pod_services = map(
            map_count_pods,
            reduce(vec![
                map(map_pod_to_service, pods.clone()),
                map(map_service_identity, select(SELECT_SERVICE)),
            ]),
        );

        Self {
            endpoints,
            processes,
            process_names,
            containers,
            containers_with_image_name,
            container_images,
            addresses,
            hosts,
            pods,
            pod_services,
            cache,
        }
    }

    /// The cache shared by the memoised views.
    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }
}

impl Default for Topologies {
    fn default() -> Self {
        Self::new(Arc::new(RenderCache::default()))
    }
}

impl std::fmt::Debug for Topologies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topologies")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
