// Provider-side packages calling into the SDK packages from sdk_packages.rs

pub const PROVIDER_NETWORK_PATH: &str = "github.com/hashicorp/terraform-provider-azurerm/internal/services/network";

pub const PROVIDER_NETWORK: &str = r#"
package network

import (
	"context"
	"fmt"
	"log"

	"github.com/Azure/azure-sdk-for-go/services/compute/mgmt/2021-07-01/compute"
	"github.com/hashicorp/go-azure-sdk/resource-manager/network/2023-09-01/virtualnetworks"
)

type Client struct {
	VirtualNetworks *virtualnetworks.VirtualNetworksClient
	VMClient        *compute.VirtualMachinesClient
}

func resourceVirtualNetworkCreate(ctx context.Context, meta interface{}) error {
	client := meta.(*Client).VirtualNetworks
	id := virtualnetworks.NewVirtualNetworkID("sub", "rg", "vnet")
	payload := virtualnetworks.VirtualNetwork{}

	if _, err := client.CreateOrUpdate(ctx, id, payload); err != nil {
		return fmt.Errorf("creating %s: %+v", id, err)
	}
	return nil
}

func resourceVirtualNetworkUpdate(ctx context.Context, meta interface{}) error {
	client := meta.(*Client).VirtualNetworks
	id := virtualnetworks.NewVirtualNetworkID("sub", "rg", "vnet")

	if err := client.CreateOrUpdateThenPoll(ctx, id, virtualnetworks.VirtualNetwork{}); err != nil {
		return fmt.Errorf("updating %s: %+v", id, err)
	}
	if _, err := client.UpdateTags(ctx, id, virtualnetworks.VirtualNetwork{}); err != nil {
		return err
	}
	return nil
}

func resourceVirtualNetworkDelete(ctx context.Context, meta interface{}) error {
	client := meta.(*Client).VirtualNetworks
	id := virtualnetworks.NewVirtualNetworkID("sub", "rg", "vnet")

	deleteFuture, err := client.Delete(ctx, id)
	if err != nil {
		return err
	}
	log.Printf("[DEBUG] waiting for %v", deleteFuture)
	return nil
}

func resourceVirtualMachineCreate(ctx context.Context, meta interface{}) error {
	vmClient := meta.(*Client).VMClient

	_, err := vmClient.CreateOrUpdate(ctx, "rg", "vm", compute.VirtualMachine{})
	if err != nil {
		return err
	}

	future, err := vmClient.Delete(ctx, "rg", "vm")
	if err != nil {
		return err
	}
	log.Printf("[DEBUG] waiting for %v", future)

	_, err = vmClient.InstanceView(ctx, "rg", "vm")
	return err
}

func resourceVirtualMachineDeallocate(ctx context.Context, vmClient compute.VirtualMachinesClient) error {
	_, err := vmClient.Deallocate(ctx, "rg", "vm")
	return err
}
"#;

pub const PROVIDER_DNS_PATH: &str = "github.com/hashicorp/terraform-provider-azurerm/internal/services/dns";

pub const PROVIDER_DNS: &str = r#"
package dns

import (
	"context"

	"github.com/hashicorp/go-azure-sdk/resource-manager/network/2023-09-01/virtualnetworks"
)

type LinkClient struct {
	VirtualNetworks virtualnetworks.VirtualNetworksClient
}

func deleteLinkedNetworks(ctx context.Context, c LinkClient, ids []virtualnetworks.VirtualNetworkId) error {
	for _, id := range ids {
		if _, err := c.VirtualNetworks.Delete(ctx, id); err != nil {
			return err
		}
	}
	return nil
}

func recreateNetwork(ctx context.Context, c *LinkClient, id virtualnetworks.VirtualNetworkId) error {
	resp, err := c.VirtualNetworks.CreateOrUpdate(ctx, id, virtualnetworks.VirtualNetwork{})
	if err != nil {
		return err
	}
	_ = resp
	return c.VirtualNetworks.DeleteThenPoll(ctx, id)
}

func purgeNetwork(ctx context.Context, c LinkClient, id virtualnetworks.VirtualNetworkId) {
	c.VirtualNetworks.Delete(ctx, id)
}
"#;

pub const PROVIDER_SUBNET_PATH: &str = "github.com/hashicorp/terraform-provider-azurerm/internal/services/subnet";

pub const PROVIDER_SUBNET: &str = r#"
package subnet

import (
	"context"

	"github.com/Azure/azure-sdk-for-go/services/compute/mgmt/2021-07-01/compute"
	"github.com/hashicorp/go-azure-sdk/resource-manager/network/2023-09-01/virtualnetworks"
)

type Client struct {
	VirtualNetworks *virtualnetworks.VirtualNetworksClient
	VMClient        *compute.VirtualMachinesClient
}

func recreateAfterDeallocate(ctx context.Context, meta interface{}, id virtualnetworks.VirtualNetworkId, deallocate bool) error {
	client := meta.(*Client).VirtualNetworks
	if deallocate {
		client := meta.(*Client).VMClient
		_ = client
	}
	_, err := client.CreateOrUpdate(ctx, id, virtualnetworks.VirtualNetwork{})
	return err
}

func deleteAll(ctx context.Context, clients []*virtualnetworks.VirtualNetworksClient, id virtualnetworks.VirtualNetworkId) error {
	for _, c := range clients {
		if _, err := c.Delete(ctx, id); err != nil {
			return err
		}
	}
	return nil
}

func deleteByName(ctx context.Context, clients map[string]virtualnetworks.VirtualNetworksClient, target virtualnetworks.VirtualNetworkId) error {
	for _, c := range clients {
		if _, err := c.Delete(ctx, target); err != nil {
			return err
		}
	}
	return nil
}

func deleteAny(ctx context.Context, raw interface{}, networkId virtualnetworks.VirtualNetworkId) error {
	switch c := raw.(type) {
	case *virtualnetworks.VirtualNetworksClient:
		_, err := c.Delete(ctx, networkId)
		return err
	case compute.VirtualMachinesClient:
		_, err := c.Deallocate(ctx, "rg", "vm")
		return err
	}
	return nil
}
"#;
