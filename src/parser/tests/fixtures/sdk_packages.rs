// Trimmed-down SDK packages as they appear in the module cache or vendor/

pub const AUTOREST_AZURE_PATH: &str = "github.com/Azure/go-autorest/autorest/azure";

pub const AUTOREST_AZURE: &str = r#"
package azure

import "net/http"

// FutureAPI contains the set of methods on the Future type.
type FutureAPI interface {
	Response() *http.Response
	Status() string
	PollingMethod() PollingMethodType
}

type PollingMethodType string

type Future struct {
	pt pollingTracker
}

type pollingTracker interface {
	hasSucceeded() bool
}
"#;

pub const TRACK1_COMPUTE_PATH: &str = "github.com/Azure/azure-sdk-for-go/services/compute/mgmt/2021-07-01/compute";

pub const TRACK1_COMPUTE: &str = r#"
package compute

import (
	"context"
	"net/http"

	"github.com/Azure/go-autorest/autorest"
	"github.com/Azure/go-autorest/autorest/azure"
)

type BaseClient struct {
	autorest.Client
	BaseURI        string
	SubscriptionID string
}

type VirtualMachinesClient struct {
	BaseClient
}

type VirtualMachinesCreateOrUpdateFuture struct {
	azure.FutureAPI
	Result func(VirtualMachinesClient) (VirtualMachine, error)
}

type VirtualMachinesDeleteFuture struct {
	azure.FutureAPI
	Result func(VirtualMachinesClient) (autorest.Response, error)
}

type VirtualMachinesDeallocateFuture = VirtualMachinesDeleteFuture

// Not a future: the second field just happens to be called Future.
type VirtualMachineInstanceView struct {
	autorest.Response
	Future azure.Future
}

type VirtualMachine struct {
	autorest.Response
	Name *string
}

func NewVirtualMachinesClient(subscriptionID string) VirtualMachinesClient {
	return VirtualMachinesClient{NewWithBaseURI(subscriptionID)}
}

func NewWithBaseURI(subscriptionID string) BaseClient {
	return BaseClient{SubscriptionID: subscriptionID}
}

func (client VirtualMachinesClient) CreateOrUpdate(ctx context.Context, resourceGroupName string, VMName string, parameters VirtualMachine) (result VirtualMachinesCreateOrUpdateFuture, err error) {
	req, err := client.CreateOrUpdatePreparer(ctx, resourceGroupName, VMName, parameters)
	if err != nil {
		return
	}
	result, err = client.CreateOrUpdateSender(req)
	return
}

func (client VirtualMachinesClient) CreateOrUpdatePreparer(ctx context.Context, resourceGroupName string, VMName string, parameters VirtualMachine) (*http.Request, error) {
	return nil, nil
}

func (client VirtualMachinesClient) CreateOrUpdateSender(req *http.Request) (future VirtualMachinesCreateOrUpdateFuture, err error) {
	return
}

func (client VirtualMachinesClient) Delete(ctx context.Context, resourceGroupName string, VMName string) (result VirtualMachinesDeleteFuture, err error) {
	return
}

func (client VirtualMachinesClient) Deallocate(ctx context.Context, resourceGroupName string, VMName string) (result VirtualMachinesDeallocateFuture, err error) {
	return
}

func (client VirtualMachinesClient) InstanceView(ctx context.Context, resourceGroupName string, VMName string) (result VirtualMachineInstanceView, err error) {
	return
}
"#;

pub const PANDORA_VNET_PATH: &str = "github.com/hashicorp/go-azure-sdk/resource-manager/network/2023-09-01/virtualnetworks";

pub const PANDORA_VNET_CLIENT: &str = r#"
package virtualnetworks

import (
	"fmt"

	"github.com/hashicorp/go-azure-sdk/sdk/client/resourcemanager"
	sdkEnv "github.com/hashicorp/go-azure-sdk/sdk/environments"
)

type VirtualNetworksClient struct {
	Client *resourcemanager.Client
}

func NewVirtualNetworksClientWithBaseURI(sdkApi sdkEnv.Api) (*VirtualNetworksClient, error) {
	client, err := resourcemanager.NewResourceManagerClient(sdkApi, "virtualnetworks", defaultApiVersion)
	if err != nil {
		return nil, fmt.Errorf("instantiating VirtualNetworksClient: %+v", err)
	}

	return &VirtualNetworksClient{
		Client: client,
	}, nil
}

const defaultApiVersion = "2023-09-01"

type VirtualNetwork struct {
	Id       *string
	Location *string
	Name     *string
}

type VirtualNetworkId struct {
	SubscriptionId    string
	ResourceGroupName string
	VirtualNetworkName string
}

func NewVirtualNetworkID(subscriptionId string, resourceGroupName string, virtualNetworkName string) VirtualNetworkId {
	return VirtualNetworkId{
		SubscriptionId:     subscriptionId,
		ResourceGroupName:  resourceGroupName,
		VirtualNetworkName: virtualNetworkName,
	}
}
"#;

pub const PANDORA_VNET_METHODS: &str = r#"
package virtualnetworks

import (
	"context"
	"net/http"

	"github.com/hashicorp/go-azure-sdk/sdk/client/pollers"
)

type CreateOrUpdateOperationResponse struct {
	Poller       pollers.Poller
	HttpResponse *http.Response
	Model        *VirtualNetwork
}

type DeleteOperationResponse struct {
	Poller       pollers.Poller
	HttpResponse *http.Response
}

type UpdateTagsOperationResponse struct {
	HttpResponse *http.Response
	Model        *VirtualNetwork
}

func (c VirtualNetworksClient) CreateOrUpdate(ctx context.Context, id VirtualNetworkId, input VirtualNetwork) (result CreateOrUpdateOperationResponse, err error) {
	return
}

func (c VirtualNetworksClient) CreateOrUpdateThenPoll(ctx context.Context, id VirtualNetworkId, input VirtualNetwork) error {
	result, err := c.CreateOrUpdate(ctx, id, input)
	if err != nil {
		return err
	}
	return result.Poller.PollUntilDone(ctx)
}

func (c VirtualNetworksClient) Delete(ctx context.Context, id VirtualNetworkId) (result DeleteOperationResponse, err error) {
	return
}

func (c VirtualNetworksClient) DeleteThenPoll(ctx context.Context, id VirtualNetworkId) error {
	return nil
}

func (c VirtualNetworksClient) UpdateTags(ctx context.Context, id VirtualNetworkId, input VirtualNetwork) (result UpdateTagsOperationResponse, err error) {
	return
}

func (c VirtualNetworksClient) deleteThenPollWithRetry(ctx context.Context, id VirtualNetworkId) error {
	return nil
}
"#;
